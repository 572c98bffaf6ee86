//! This module provides a struct for representing reactions
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::union_preserving_order;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Raw text of the reaction's equation
    #[builder(default = "String::new()")]
    pub equation: String,
    /// Whether the reaction may proceed in both directions
    #[builder(default = "false")]
    pub reversibility: bool,
    /// Reactants followed by products, each in the order they appear in the equation
    #[builder(default = "Vec::new()")]
    pub participants: Vec<Participant>,
    /// Metabolic processes (pathways) the reaction belongs to
    #[builder(default = "Vec::new()")]
    pub processes: Vec<String>,
    /// Genes associated with the reaction
    #[builder(default = "Vec::new()")]
    pub genes: Vec<String>,
    /// External identifiers, keyed by database category
    #[builder(default = "IndexMap::new()")]
    pub references: IndexMap<String, Vec<String>>,
    /// Reactions with the same reactant and product metabolites, this one included
    #[builder(default = "Vec::new()")]
    #[serde(default)]
    pub replicates: Vec<String>,
}

/// A metabolite taking part in a reaction within a specific compartment
///
/// # Note:
/// The metabolite and compartment are referenced by id only, the model owns the entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub metabolite_id: String,
    pub compartment_id: String,
    pub coefficient: f64,
    pub role: Role,
}

impl Participant {
    pub fn new(metabolite_id: &str, compartment_id: &str, coefficient: f64, role: Role) -> Self {
        Participant {
            metabolite_id: metabolite_id.to_string(),
            compartment_id: compartment_id.to_string(),
            coefficient,
            role,
        }
    }
}

/// Side of the reaction a participant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reactant,
    Product,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Reactant => write!(f, "reactant"),
            Role::Product => write!(f, "product"),
        }
    }
}

/// Movement of a metabolite between compartments within a single reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub metabolite: String,
    /// Compartments the metabolite occupies as a reactant
    pub source: Vec<String>,
    /// Compartments the metabolite occupies as a product
    pub destination: Vec<String>,
}

impl Transport {
    /// Source then destination compartments, without repeats
    pub fn compartments(&self) -> Vec<String> {
        union_preserving_order([self.source.as_slice(), self.destination.as_slice()])
    }
}

fn same_members(first: &[&str], second: &[&str]) -> bool {
    first.iter().all(|m| second.contains(m)) && second.iter().all(|m| first.contains(m))
}

impl Reaction {
    /// Participants with the given role, in order
    pub fn participants_by_role(&self, role: Role) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.role == role)
    }

    /// Whether any participant is in `compartment`
    pub fn involves_compartment(&self, compartment: &str) -> bool {
        self.participants
            .iter()
            .any(|p| p.compartment_id == compartment)
    }

    /// Whether the reaction chemically converts its reactants
    ///
    /// A reaction whose reactant and product metabolites are the same set (e.g. a pure transport)
    /// is not a conversion.
    pub fn is_conversion(&self) -> bool {
        let reactants = self.metabolites_with_role(Role::Reactant);
        let products = self.metabolites_with_role(Role::Product);
        !same_members(&reactants, &products)
    }

    /// Whether `other` has the same reactant metabolites and the same product metabolites
    ///
    /// Compartments and coefficients are not compared.
    pub fn same_metabolites(&self, other: &Reaction) -> bool {
        same_members(
            &self.metabolites_with_role(Role::Reactant),
            &other.metabolites_with_role(Role::Reactant),
        ) && same_members(
            &self.metabolites_with_role(Role::Product),
            &other.metabolites_with_role(Role::Product),
        )
    }

    /// Whether other reactions share this one's reactant and product metabolites
    pub fn is_replicated(&self) -> bool {
        self.replicates.len() > 1
    }

    /// Whether the participants span more than one compartment
    pub fn is_dispersal(&self) -> bool {
        let mut compartments: Vec<&str> = Vec::new();
        for participant in &self.participants {
            if !compartments.contains(&participant.compartment_id.as_str()) {
                compartments.push(&participant.compartment_id);
            }
        }
        compartments.len() > 1
    }

    /// Metabolites that are both reactants and products in different compartments
    pub fn transports(&self) -> Vec<Transport> {
        let reactants = self.metabolites_with_role(Role::Reactant);
        let products = self.metabolites_with_role(Role::Product);
        let mut transports = Vec::new();
        for metabolite in products.iter().filter(|m| reactants.contains(*m)) {
            let source = self.compartments_of(metabolite, Role::Reactant);
            let destination = self.compartments_of(metabolite, Role::Product);
            let same = source.iter().all(|c| destination.contains(c))
                && destination.iter().all(|c| source.contains(c));
            if !same {
                transports.push(Transport {
                    metabolite: metabolite.to_string(),
                    source,
                    destination,
                });
            }
        }
        transports
    }

    fn metabolites_with_role(&self, role: Role) -> Vec<&str> {
        let mut metabolites: Vec<&str> = Vec::new();
        for participant in self.participants_by_role(role) {
            if !metabolites.contains(&participant.metabolite_id.as_str()) {
                metabolites.push(&participant.metabolite_id);
            }
        }
        metabolites
    }

    fn compartments_of(&self, metabolite: &str, role: Role) -> Vec<String> {
        let mut compartments: Vec<String> = Vec::new();
        for participant in self.participants_by_role(role) {
            if participant.metabolite_id == metabolite
                && !compartments.contains(&participant.compartment_id)
            {
                compartments.push(participant.compartment_id.clone());
            }
        }
        compartments
    }
}
