//! Read, index and write SBML model descriptions
//!
//! The document is held as an owned element tree. [`SbmlModel`] indexes the compartment,
//! species and reaction sections by id, and [`SbmlEdit`] is the mutable copy normalization
//! stages work on.
use thiserror::Error;

pub mod element;
pub mod model;

pub use element::{Element, Node, SbmlDocument};
pub use model::{Section, SbmlEdit, SbmlModel, TreeDanglingReference};

/// Errors from reading, indexing or writing an SBML document
#[derive(Error, Debug)]
pub enum SbmlError {
    /// The document lacks an expected section, or has them out of order
    #[error("Malformed model: {0}")]
    MalformedModel(String),
    /// Two components of one section share an id
    #[error("Duplicate identifier `{id}` in {section}")]
    DuplicateIdentifier { section: &'static str, id: String },
    /// The XML itself could not be parsed
    #[error("Invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Names, attributes or text were not valid UTF-8
    #[error("Invalid UTF-8 in document: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// Unable to read or write the document
    #[error("Unable to access document: {0}")]
    Io(#[from] std::io::Error),
}
