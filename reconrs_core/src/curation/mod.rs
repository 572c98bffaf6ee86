//! Apply curator edit tables to a structured model
//!
//! Every operation takes the model by reference and returns a new one, checking referential
//! integrity before handing it back. Integrity violations are never repaired, the curator
//! has to correct the table.
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::CurationConfiguration;
use crate::io::table::{read_table_from_path, Columns, TableError};
use crate::metabolic_model::model::IntegrityError;

pub mod enhancement;
pub mod overrides;
pub mod removal;
pub mod substitution;
pub mod translation;

pub use enhancement::{
    change_compartments, change_metabolites, change_processes, change_reactions,
    enrich_reaction_names, include_reactions_replications, include_reactions_transport_processes,
};
pub use overrides::{override_metabolite_fields, override_reaction_fields};
pub use removal::{remove_metabolites, remove_reactions};
pub use substitution::{AmbiguousSubstitution, TranslationReport};
pub use translation::translate_identifiers;

// region Edit Tables
/// Rename `identifier_original` to `identifier_novel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
    pub identifier_original: String,
    pub identifier_novel: String,
}

impl TranslationRow {
    pub fn new(identifier_original: &str, identifier_novel: &str) -> Self {
        TranslationRow {
            identifier_original: identifier_original.to_string(),
            identifier_novel: identifier_novel.to_string(),
        }
    }
}

/// Delete a metabolite and point its participants at the replacement
///
/// An empty replacement leaves the participants as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaboliteRemovalRow {
    pub removal_identifier: String,
    #[serde(default)]
    pub replacement_identifier: String,
}

impl MetaboliteRemovalRow {
    pub fn new(removal_identifier: &str, replacement_identifier: &str) -> Self {
        MetaboliteRemovalRow {
            removal_identifier: removal_identifier.to_string(),
            replacement_identifier: replacement_identifier.to_string(),
        }
    }
}

/// Delete a reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRemovalRow {
    pub identifier: String,
}

/// Replace one field of an entity with a literal value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverrideRow {
    pub identifier: String,
    pub field: String,
    #[serde(default)]
    pub value: String,
}

impl FieldOverrideRow {
    pub fn new(identifier: &str, field: &str, value: &str) -> Self {
        FieldOverrideRow {
            identifier: identifier.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Rename an entity (same id, new name) or replace it (same name, new id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRow {
    pub identifier_original: String,
    pub identifier_novel: String,
    pub name_original: String,
    pub name_novel: String,
}

/// What a change row asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Rename,
    Replace,
    /// Both or neither of identifier and name change
    Ignored,
}

impl ChangeRow {
    pub fn new(
        identifier_original: &str,
        identifier_novel: &str,
        name_original: &str,
        name_novel: &str,
    ) -> Self {
        ChangeRow {
            identifier_original: identifier_original.to_string(),
            identifier_novel: identifier_novel.to_string(),
            name_original: name_original.to_string(),
            name_novel: name_novel.to_string(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        let same_identifier = self.identifier_original == self.identifier_novel;
        let same_name = self.name_original == self.name_novel;
        match (same_identifier, same_name) {
            (true, false) => ChangeKind::Rename,
            (false, true) => ChangeKind::Replace,
            _ => ChangeKind::Ignored,
        }
    }
}

/// Read a curator edit table with a header row naming the fields of `T`
pub fn read_edit_table<T, P>(
    path: P,
    config: &CurationConfiguration,
) -> Result<Vec<T>, CurationError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    Ok(read_table_from_path(path, config.table_delimiter, Columns::Header)?)
}
// endregion Edit Tables

/// Errors from applying edit tables
#[derive(Error, Debug)]
pub enum CurationError {
    /// Participants reference metabolites or compartments absent from the edited model
    #[error("Edited model is inconsistent: {0}")]
    DanglingReferences(#[from] IntegrityError),
    /// A translation target matched inside an identifier rather than at its start
    #[error("Ambiguous substitution: {0}")]
    AmbiguousSubstitution(AmbiguousSubstitution),
    /// A row names an unknown field or entity, or holds an unusable value
    #[error("Malformed edit table row {row}: {reason}")]
    MalformedEditTable { row: usize, reason: String },
    /// The edit table could not be read
    #[error("Unable to read edit table: {0}")]
    Table(#[from] TableError),
}
