//! This module provides the metabolite struct representing a metabolite

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::union_preserving_order;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Molecular mass of the metabolite
    #[builder(default = "None")]
    pub mass: Option<f64>,
    /// Electrical charge of the Metabolite
    #[builder(default = "None")]
    pub charge: Option<i32>,
    /// External identifiers, keyed by database category
    #[builder(default = "IndexMap::new()")]
    pub references: IndexMap<String, Vec<String>>,
}

impl Metabolite {
    /// Create a new metabolite with only an id
    pub fn new_id_only(id: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            formula: None,
            mass: None,
            charge: None,
            references: IndexMap::new(),
        }
    }

    /// Fold the references of another metabolite into this one
    ///
    /// Categories keep their order of first appearance, and identifiers already present in a
    /// category are not repeated.
    pub fn absorb_references(&mut self, other: &Metabolite) {
        for (category, identifiers) in &other.references {
            let merged = match self.references.get(category) {
                Some(existing) => {
                    union_preserving_order([existing.as_slice(), identifiers.as_slice()])
                }
                None => identifiers.clone(),
            };
            self.references.insert(category.clone(), merged);
        }
    }
}
