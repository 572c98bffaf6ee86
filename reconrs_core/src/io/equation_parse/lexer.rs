//! Lex a reaction equation string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::equation_parse::token::{Direction, Token};

const SPECIES_SEPARATOR: char = '@';

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::Eof);
        Ok(self.tokens.clone())
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c = self.advance();
        if c.is_whitespace() {
            return Ok(());
        }
        self.read_word()
    }

    fn read_word(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() && !self.peek().is_whitespace() {
            self.advance();
        }
        let word: String = self.source[self.start..self.current].iter().collect();

        let token = match word.as_str() {
            "+" => Token::Plus,
            "<==>" => Token::Arrow(Direction::Bidirectional),
            "-->" => Token::Arrow(Direction::Forward),
            "<--" => Token::Arrow(Direction::Reverse),
            w if w.contains(SPECIES_SEPARATOR) => Lexer::species(w)?,
            w => match w.parse::<f64>() {
                Ok(value) if value.is_finite() => Token::Coefficient(value),
                _ => Token::Bare(w.to_string()),
            },
        };
        self.tokens.push(token);
        Ok(())
    }

    fn species(word: &str) -> Result<Token, LexerError> {
        match word.split_once(SPECIES_SEPARATOR) {
            Some((metabolite, compartment))
                if !metabolite.is_empty()
                    && !compartment.is_empty()
                    && !compartment.contains(SPECIES_SEPARATOR) =>
            {
                Ok(Token::Species {
                    metabolite: metabolite.to_string(),
                    compartment: compartment.to_string(),
                })
            }
            _ => Err(LexerError::InvalidSpecies(word.to_string())),
        }
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    /// A word containing `@` did not have the form `<metabolite>@<compartment>`
    #[error("Invalid species `{0}`, expected <metabolite>@<compartment>")]
    InvalidSpecies(String),
}
