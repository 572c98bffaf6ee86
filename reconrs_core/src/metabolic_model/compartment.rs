//! Compartments hosting a model's metabolites
use serde::{Deserialize, Serialize};

/// A physical or logical location, such as the cytosol or the model boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compartment {
    pub id: String,
    pub name: String,
}

impl Compartment {
    pub fn new(id: &str, name: &str) -> Self {
        Compartment {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}
