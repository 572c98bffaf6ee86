//! Configuration shared by the normalization, extraction and curation stages
use std::fs;
use std::path::Path;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings passed explicitly into every pipeline entry point
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfiguration {
    /// Identifier of the compartment representing the model's boundary
    #[builder(default = "String::from(\"b\")")]
    pub boundary_compartment: String,
    /// Descriptive name given to the boundary compartment
    #[builder(default = "String::from(\"model boundary\")")]
    pub boundary_compartment_name: String,
    /// Compartment letters which may appear in `<base>_<letter>_boundary` species ids
    #[builder(default = "String::from(\"eciglmnrx\")")]
    pub boundary_compartment_letters: String,
    /// Identifier of the extracellular compartment
    #[builder(default = "String::from(\"e\")")]
    pub extracellular_compartment: String,
    /// Descriptive name given to the extracellular compartment
    #[builder(default = "String::from(\"extracellular region\")")]
    pub extracellular_compartment_name: String,
    /// Literal prefix stripped from species identifiers
    #[builder(default = "String::from(\"M_\")")]
    pub species_prefix: String,
    /// Marker preceding species identifiers in annotation `about` attributes
    #[builder(default = "String::from(\"#\")")]
    pub annotation_marker: String,
    /// Delimiter wrapped around identifiers when matching translation targets
    #[builder(default = "String::from(\"_\")")]
    pub translation_delimiter: String,
    /// Treat an ambiguous substitution as a hard error rather than a reported warning
    #[builder(default = "false")]
    pub reject_ambiguous_substitutions: bool,
    /// Delimiter of every tabular source
    #[builder(default = "b'\\t'")]
    pub table_delimiter: u8,
    /// Separator of list valued fields (genes, enzyme commission numbers, ...)
    #[builder(default = "String::from(\";\")")]
    pub list_separator: String,
    /// Map of metabolite reference category to the key marking it in annotation strings
    #[builder(default = "default_metabolite_reference_keys()")]
    pub metabolite_reference_keys: IndexMap<String, String>,
    /// Map of reaction reference category to the key marking it in annotation strings
    #[builder(default = "default_reaction_reference_keys()")]
    pub reaction_reference_keys: IndexMap<String, String>,
    /// Category holding an entity's own and prior (deprecated) identifiers
    #[builder(default = "String::from(\"metanetx\")")]
    pub prior_identifier_category: String,
    /// Key marking prior identifiers in annotation strings
    #[builder(default = "String::from(\"deprecated:\")")]
    pub prior_identifier_key: String,
    /// Category holding a reaction's identifiers in the original network
    #[builder(default = "String::from(\"recon2m2\")")]
    pub native_identifier_category: String,
    /// Category holding a reaction's enzyme commission numbers
    #[builder(default = "String::from(\"enzyme_commission\")")]
    pub enzyme_commission_category: String,
    /// Key marking metabolic processes in a reaction's process field
    #[builder(default = "String::from(\"model:\")")]
    pub process_key: String,
}

impl Default for CurationConfiguration {
    fn default() -> Self {
        CurationConfiguration {
            boundary_compartment: String::from("b"),
            boundary_compartment_name: String::from("model boundary"),
            boundary_compartment_letters: String::from("eciglmnrx"),
            extracellular_compartment: String::from("e"),
            extracellular_compartment_name: String::from("extracellular region"),
            species_prefix: String::from("M_"),
            annotation_marker: String::from("#"),
            translation_delimiter: String::from("_"),
            reject_ambiguous_substitutions: false,
            table_delimiter: b'\t',
            list_separator: String::from(";"),
            metabolite_reference_keys: default_metabolite_reference_keys(),
            reaction_reference_keys: default_reaction_reference_keys(),
            prior_identifier_category: String::from("metanetx"),
            prior_identifier_key: String::from("deprecated:"),
            native_identifier_category: String::from("recon2m2"),
            enzyme_commission_category: String::from("enzyme_commission"),
            process_key: String::from("model:"),
        }
    }
}

impl CurationConfiguration {
    /// Read a configuration from a JSON file, fields absent from the file keep their defaults
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

fn key_map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(category, key)| (category.to_string(), key.to_string()))
        .collect()
}

fn default_metabolite_reference_keys() -> IndexMap<String, String> {
    key_map(&[
        ("chebi", "chebi:"),
        ("bigg", "bigg:"),
        ("envipath", "envipath:"),
        ("hmdb", "hmdb:"),
        ("kegg", "kegg:"),
        ("lipidmaps", "lipidmaps:"),
        ("metacyc", "metacyc:"),
        ("reactome", "reactome:"),
        ("sabiork", "sabiork:"),
        ("seed", "seed:"),
        ("slm", "slm:"),
    ])
}

fn default_reaction_reference_keys() -> IndexMap<String, String> {
    key_map(&[
        ("rhea", "rhea:"),
        ("bigg", "bigg:"),
        ("kegg", "kegg:"),
        ("metacyc", "metacyc:"),
        ("reactome", "reactome:"),
        ("sabiork", "sabiork:"),
        ("seed", "seed:"),
    ])
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unable to read configuration file")]
    UnableToRead(#[from] std::io::Error),
    #[error("Unable to parse configuration: {0}")]
    UnableToParse(#[from] serde_json::Error),
}
