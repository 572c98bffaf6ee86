//! Module providing JSON snapshots of reconrs Models
//!
//! A snapshot stages a model between extraction and curation. Reactions may omit their
//! participants, in which case they are parsed again from the equation on load.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::equation_parse::{parse_equation, EquationParseError};
use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{
    Participant, Reaction, ReactionBuilder, ReactionBuilderError,
};

const SNAPSHOT_VERSION: &str = "1";

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing snapshots
#[derive(Serialize, Deserialize)]
struct JsonModel {
    #[serde(default)]
    compartments: Vec<JsonCompartment>,
    #[serde(default)]
    metabolites: Vec<JsonMetabolite>,
    #[serde(default)]
    reactions: Vec<JsonReaction>,
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonCompartment {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    formula: Option<String>,
    mass: Option<f64>,
    charge: Option<i32>,
    #[serde(default)]
    references: IndexMap<String, Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    #[serde(default)]
    equation: String,
    #[serde(default)]
    reversibility: bool,
    participants: Option<Vec<Participant>>,
    #[serde(default)]
    processes: Vec<String>,
    #[serde(default)]
    genes: Vec<String>,
    #[serde(default)]
    references: IndexMap<String, Vec<String>>,
    #[serde(default)]
    replicates: Vec<String>,
}
// endregion JSON Model

// region Conversions
impl From<JsonCompartment> for Compartment {
    fn from(c: JsonCompartment) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

impl From<Compartment> for JsonCompartment {
    fn from(c: Compartment) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            formula: m.formula,
            mass: m.mass,
            charge: m.charge,
            references: m.references,
        }
    }
}

impl From<Metabolite> for JsonMetabolite {
    fn from(m: Metabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            formula: m.formula,
            mass: m.mass,
            charge: m.charge,
            references: m.references,
        }
    }
}

impl From<Reaction> for JsonReaction {
    fn from(r: Reaction) -> Self {
        Self {
            id: r.id,
            name: r.name,
            equation: r.equation,
            reversibility: r.reversibility,
            participants: Some(r.participants),
            processes: r.processes,
            genes: r.genes,
            references: r.references,
            replicates: r.replicates,
        }
    }
}

impl TryFrom<JsonReaction> for Reaction {
    type Error = JsonError;

    fn try_from(rxn: JsonReaction) -> Result<Self, Self::Error> {
        // Participants left out of the snapshot are recovered from the equation
        let (reversibility, participants) = match rxn.participants {
            Some(participants) => (rxn.reversibility, participants),
            None => {
                let parsed = parse_equation(&rxn.equation).map_err(|source| {
                    JsonError::EquationParseError {
                        reaction: rxn.id.clone(),
                        source,
                    }
                })?;
                (parsed.reversibility, parsed.participants)
            }
        };
        Ok(ReactionBuilder::default()
            .id(rxn.id)
            .name(rxn.name)
            .equation(rxn.equation)
            .reversibility(reversibility)
            .participants(participants)
            .processes(rxn.processes)
            .genes(rxn.genes)
            .references(rxn.references)
            .replicates(rxn.replicates)
            .build()?)
    }
}

impl Model {
    /// Read a model snapshot from a JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = fs::read_to_string(path)?;
        Model::from_json_str(&model_str)
    }

    /// Write a model snapshot to a JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let model_string = self.to_json_string()?;
        fs::write(path, model_string)?;
        Ok(())
    }

    pub fn from_json_str(model_str: &str) -> Result<Model, JsonError> {
        let json_model = serde_json::from_str::<JsonModel>(model_str)?;
        Model::from_json(json_model)
    }

    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        for c in json_model.compartments {
            if model.compartments.contains_key(&c.id) {
                return Err(JsonError::DuplicateIdentifier(c.id));
            }
            model.add_compartment(c.into());
        }
        for m in json_model.metabolites {
            if model.metabolites.contains_key(&m.id) {
                return Err(JsonError::DuplicateIdentifier(m.id));
            }
            model.add_metabolite(m.into());
        }
        for rxn in json_model.reactions {
            if model.reactions.contains_key(&rxn.id) {
                return Err(JsonError::DuplicateIdentifier(rxn.id));
            }
            model.add_reaction(Reaction::try_from(rxn)?);
        }
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        JsonModel {
            compartments: self.compartments.values().cloned().map(Into::into).collect(),
            metabolites: self.metabolites.values().cloned().map(Into::into).collect(),
            reactions: self.reactions.values().cloned().map(Into::into).collect(),
            version: Some(SNAPSHOT_VERSION.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to parse the equation of reaction {reaction}: {source}")]
    EquationParseError {
        reaction: String,
        source: EquationParseError,
    },
    #[error("Identifier {0} appears more than once in the snapshot")]
    DuplicateIdentifier(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Serde json parse error: {0}")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to access snapshot file: {0}")]
    UnableToAccess(#[from] std::io::Error),
}

// endregion Conversions
