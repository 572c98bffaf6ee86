//! Tabular review reports of a model's metabolites and reactions
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::configuration::CurationConfiguration;
use crate::io::table::{write_rows, TableError};
use crate::metabolic_model::model::Model;

/// A review table ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn write_to<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), TableError> {
        write_rows(writer, &self.headers, &self.rows, delimiter)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<(), TableError> {
        let file = File::create(path)?;
        self.write_to(file, delimiter)
    }
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// One row per metabolite with its properties and a column per reference category
///
/// The prior identifier category comes first, followed by the configured metabolite
/// categories.
pub fn metabolite_report(model: &Model, config: &CurationConfiguration) -> Report {
    let mut categories = vec![config.prior_identifier_category.clone()];
    categories.extend(
        config
            .metabolite_reference_keys
            .keys()
            .filter(|c| **c != config.prior_identifier_category)
            .cloned(),
    );

    let mut headers: Vec<String> = ["identifier", "name", "formula", "mass", "charge"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers.extend(categories.iter().map(|c| format!("reference_{}", c)));

    let rows = model
        .metabolites
        .values()
        .map(|metabolite| {
            let mut row = vec![
                metabolite.id.clone(),
                optional(&metabolite.name),
                optional(&metabolite.formula),
                optional(&metabolite.mass),
                optional(&metabolite.charge),
            ];
            row.extend(categories.iter().map(|category| {
                metabolite
                    .references
                    .get(category)
                    .map(|ids| ids.join(config.list_separator.as_str()))
                    .unwrap_or_default()
            }));
            row
        })
        .collect();
    Report { headers, rows }
}

/// One row per reaction with its name, behaviour, processes and genes
pub fn reaction_report(model: &Model, config: &CurationConfiguration) -> Report {
    let headers = [
        "identifier",
        "name",
        "reversibility",
        "conversion",
        "dispersal",
        "transport",
        "processes",
        "genes",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    let rows = model
        .reactions
        .values()
        .map(|reaction| {
            vec![
                reaction.id.clone(),
                optional(&reaction.name),
                reaction.reversibility.to_string(),
                reaction.is_conversion().to_string(),
                reaction.is_dispersal().to_string(),
                (!reaction.transports().is_empty()).to_string(),
                reaction.processes.join(config.list_separator.as_str()),
                reaction.genes.join(config.list_separator.as_str()),
            ]
        })
        .collect();
    Report { headers, rows }
}
