//! Module for parsing reaction equation strings into signed participant lists

use crate::io::equation_parse::lexer::LexerError;
use crate::io::equation_parse::parser::{ParseError, Term};
use crate::metabolic_model::reaction::{Participant, Role};
use thiserror::Error;

pub use crate::io::equation_parse::token::Direction;

mod lexer;
pub mod parser;
mod token;

/// Participants and reversibility read from an equation string
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEquation {
    pub reversibility: bool,
    /// Reactants followed by products, each side in textual order
    pub participants: Vec<Participant>,
}

/// Parse a reaction equation into its participants
///
/// # Parameters
/// - `input`: &str of the form `2 A@c + B@c --> C@c`. The arrow is one of `<==>`, `-->`
///     or `<--`, and a missing coefficient means 1.
///
/// # Returns
/// Parse result which is
/// - `Ok`: The reversibility and participant list of the equation
/// - `Err`: The EquationParseError describing the issue with the equation
///
/// # Examples
/// ```rust
/// use reconrs_core::io::equation_parse::parse_equation;
/// let parsed = parse_equation("2 A@c + B@c --> C@c").unwrap();
/// assert!(!parsed.reversibility);
/// assert_eq!(parsed.participants.len(), 3);
/// ```
pub fn parse_equation(input: &str) -> Result<ParsedEquation, EquationParseError> {
    let mut lexer = lexer::Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = parser::EquationParser::new(tokens);
    let sides = parser.parse()?;

    let (reactants, products) = match sides.direction {
        Direction::Bidirectional | Direction::Forward => (sides.left, sides.right),
        Direction::Reverse => (sides.right, sides.left),
    };
    let participants = reactants
        .into_iter()
        .map(|term| into_participant(term, Role::Reactant))
        .chain(
            products
                .into_iter()
                .map(|term| into_participant(term, Role::Product)),
        )
        .collect();

    Ok(ParsedEquation {
        reversibility: sides.direction == Direction::Bidirectional,
        participants,
    })
}

fn into_participant(term: Term, role: Role) -> Participant {
    Participant {
        metabolite_id: term.metabolite,
        compartment_id: term.compartment,
        coefficient: term.coefficient,
        role,
    }
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EquationParseError {
    /// Lexing Error
    #[error("Error occurred during lexing of the equation: {0}")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing of the equation: {0}")]
    ParsingError(#[from] ParseError),
}
