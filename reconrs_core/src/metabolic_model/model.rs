//! This module provides the Model struct for representing an entire metabolic model
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    /// Map of compartment ids to Compartments
    pub compartments: IndexMap<String, Compartment>,
    /// Map of metabolite ids to Metabolites
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to Reactions
    pub reactions: IndexMap<String, Reaction>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model::default()
    }

    /// Add a compartment to the model, replacing any compartment with the same id
    pub fn add_compartment(&mut self, compartment: Compartment) {
        let id = compartment.id.clone();
        self.compartments.insert(id, compartment);
    }

    /// Add a metabolite to the model, replacing any metabolite with the same id
    ///
    /// # Examples
    /// ```rust
    /// use reconrs_core::metabolic_model::metabolite::MetaboliteBuilder;
    /// use reconrs_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// let water = MetaboliteBuilder::default().id("MNXM2".to_string()).build().unwrap();
    /// model.add_metabolite(water);
    /// assert!(model.metabolites.contains_key("MNXM2"));
    /// ```
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Add a reaction to the model, replacing any reaction with the same id
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Find every participant referencing a metabolite or compartment absent from the model
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for (reaction_id, reaction) in &self.reactions {
            for participant in &reaction.participants {
                if !self.metabolites.contains_key(&participant.metabolite_id) {
                    dangling.push(DanglingReference::Metabolite {
                        reaction: reaction_id.clone(),
                        metabolite: participant.metabolite_id.clone(),
                    });
                }
                if !self.compartments.contains_key(&participant.compartment_id) {
                    dangling.push(DanglingReference::Compartment {
                        reaction: reaction_id.clone(),
                        compartment: participant.compartment_id.clone(),
                    });
                }
            }
        }
        dangling
    }

    /// Check that every reaction participant refers to an existing metabolite and compartment
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let dangling = self.dangling_references();
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(IntegrityError { dangling })
        }
    }
}

/// A participant's reference to an entity that does not exist
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DanglingReference {
    Metabolite { reaction: String, metabolite: String },
    Compartment { reaction: String, compartment: String },
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DanglingReference::Metabolite {
                reaction,
                metabolite,
            } => write!(
                f,
                "reaction {} references missing metabolite {}",
                reaction, metabolite
            ),
            DanglingReference::Compartment {
                reaction,
                compartment,
            } => write!(
                f,
                "reaction {} references missing compartment {}",
                reaction, compartment
            ),
        }
    }
}

/// Every referential integrity violation found in a model
#[derive(Clone, Debug, Error, PartialEq)]
#[error(
    "{} dangling reference(s), first: {}",
    .dangling.len(),
    .dangling.first().map(ToString::to_string).unwrap_or_default()
)]
pub struct IntegrityError {
    pub dangling: Vec<DanglingReference>,
}
