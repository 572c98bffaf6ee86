//! Module providing Token struct for lexing

/// Represents Tokens in a reaction equation
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Stoichiometric coefficient preceding a species
    Coefficient(f64),
    /// `<metabolite>@<compartment>`
    Species {
        metabolite: String,
        compartment: String,
    },
    /// Any other word, kept so the parser can report what went wrong with it
    Bare(String),
    Plus,
    Arrow(Direction),
    Eof,
}

/// Direction marked by the equation's arrow
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Direction {
    /// `<==>`
    Bidirectional,
    /// `-->`
    Forward,
    /// `<--`, the left side holds the products
    Reverse,
}
