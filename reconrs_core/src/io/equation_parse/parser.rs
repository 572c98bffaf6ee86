use crate::io::equation_parse::token::{Direction, Token};

use thiserror::Error;
/*
Equation Grammar:
equation -> side ARROW side
side -> ( term ( "+" term )* )? ;
term -> COEFFICIENT? SPECIES ;

e.g. 2 MNXM1@MNXC3 + MNXM2@MNXC3 <==> 1 MNXM3@MNXC3
 */

/// A single `<coefficient> <metabolite>@<compartment>` term
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub coefficient: f64,
    pub metabolite: String,
    pub compartment: String,
}

/// Both sides of an equation as written, along with its arrow
#[derive(Debug, Clone, PartialEq)]
pub struct EquationSides {
    pub left: Vec<Term>,
    pub direction: Direction,
    pub right: Vec<Term>,
}

/// Equation Parser
pub struct EquationParser {
    /// Vector of tokens from the equation string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl EquationParser {
    /// Create a new EquationParser
    pub fn new(tokens: Vec<Token>) -> EquationParser {
        EquationParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into the two sides of the equation
    pub fn parse(&mut self) -> Result<EquationSides, ParseError> {
        let arrows = self
            .tokens
            .iter()
            .filter(|t| matches!(t, Token::Arrow(_)))
            .count();
        match arrows {
            0 => return Err(ParseError::MissingDirection),
            1 => {}
            _ => return Err(ParseError::MultipleDirections),
        }

        let left = self.side()?;
        let direction = match self.advance() {
            Token::Arrow(direction) => direction,
            token => return Err(ParseError::UnexpectedToken(format!("{:?}", token))),
        };
        let right = self.side()?;
        if !self.is_at_end() {
            return Err(ParseError::EarlyTermination);
        }
        Ok(EquationSides {
            left,
            direction,
            right,
        })
    }

    fn side(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();
        if self.is_at_end() || self.check_arrow() {
            return Ok(terms);
        }
        terms.push(self.term()?);
        while self.match_token(Token::Plus) {
            terms.push(self.term()?);
        }
        Ok(terms)
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        let coefficient = match self.peek() {
            Token::Coefficient(value) => {
                self.advance();
                Some(value)
            }
            _ => None,
        };

        match self.peek() {
            Token::Species {
                metabolite,
                compartment,
            } => {
                self.advance();
                Ok(Term {
                    coefficient: coefficient.unwrap_or(1.0),
                    metabolite,
                    compartment,
                })
            }
            Token::Bare(word) => {
                self.advance();
                // A bare word directly followed by a species can only have been meant as its
                // coefficient
                if coefficient.is_none() && matches!(self.peek(), Token::Species { .. }) {
                    Err(ParseError::InvalidCoefficient(word))
                } else {
                    Err(ParseError::MissingCompartmentSeparator(word))
                }
            }
            _ => Err(ParseError::ExpectedTerm),
        }
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// Check whether the current token matches `token`, if it does advance [`self.current`]
    /// and return true, otherwise return false
    fn match_token(&mut self, token: Token) -> bool {
        if self.peek() == token {
            self.advance();
            return true;
        }
        false
    }

    fn check_arrow(&self) -> bool {
        matches!(self.peek(), Token::Arrow(_))
    }

    /// Advance `self.current` one position unless at end of the token Vec, then return the
    /// previous token.
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Check whether the parser is at the end of the source Vec
    fn is_at_end(&self) -> bool {
        self.peek() == Token::Eof
    }

    /// Get a copy of the current token
    fn peek(&self) -> Token {
        self.tokens
            .get(self.current)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Get a copy of the previous token
    fn previous(&self) -> Token {
        match self.current.checked_sub(1) {
            Some(index) => self.tokens.get(index).cloned().unwrap_or(Token::Eof),
            None => Token::Eof,
        }
    }

    // endregion parsing helper functions
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// None of `<==>`, `-->` or `<--` appeared in the equation
    #[error("No direction found, expected one of `<==>`, `-->` or `<--`")]
    MissingDirection,
    /// More than one arrow appeared in the equation
    #[error("More than one direction found in the equation")]
    MultipleDirections,
    /// A term had no `@` between metabolite and compartment
    #[error("Term `{0}` is missing the `@` between metabolite and compartment")]
    MissingCompartmentSeparator(String),
    /// A term's coefficient was not a finite number
    #[error("Coefficient `{0}` is not a finite number")]
    InvalidCoefficient(String),
    /// A term was expected, for example after a `+`
    #[error("Expected a term, check for a dangling `+`")]
    ExpectedTerm,
    /// A token appeared where it can not
    #[error("Unexpected token {0}")]
    UnexpectedToken(String),
    /// Expression was not completed when parsing terminated
    #[error("Parsing terminated early, check for a missing `+` between two terms")]
    EarlyTermination,
}
