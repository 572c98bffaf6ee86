//! Build a structured model from the flat MetaNetX export tables
//!
//! Extraction never stops at a bad record. Each problem is scoped to the record it was found
//! in and collected in the [`ExtractionReport`], the remaining records are extracted as usual.
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::CurationConfiguration;
use crate::io::equation_parse::{parse_equation, EquationParseError};
use crate::io::reference_parse::parse_references;
use crate::io::table::{read_table_from_path, Columns, TableError};
use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::{DanglingReference, Model};
use crate::metabolic_model::reaction::Reaction;
use crate::utils::split_list;

// region Export Tables
pub const GENE_COLUMNS: [&str; 5] = ["reaction", "genes", "low_bound", "up_bound", "direction"];
pub const COMPARTMENT_COLUMNS: [&str; 3] = ["identifier", "name", "source"];
pub const METABOLITE_COLUMNS: [&str; 7] = [
    "identifier",
    "name",
    "source",
    "formula",
    "mass",
    "charge",
    "reference",
];
pub const REACTION_COLUMNS: [&str; 7] = [
    "identifier",
    "equation",
    "recon2m2",
    "metanetx",
    "enzyme_commission",
    "process",
    "reference",
];

/// Gene association of a reaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneRecord {
    pub reaction: String,
    pub genes: String,
    pub low_bound: String,
    pub up_bound: String,
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompartmentRecord {
    pub identifier: String,
    pub name: String,
    pub source: String,
}

/// Metabolite row, numeric fields are kept as text until extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaboliteRecord {
    pub identifier: String,
    pub name: String,
    pub source: String,
    pub formula: String,
    pub mass: String,
    pub charge: String,
    pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionRecord {
    pub identifier: String,
    pub equation: String,
    pub recon2m2: String,
    pub metanetx: String,
    pub enzyme_commission: String,
    pub process: String,
    pub reference: String,
}

/// The four export tables, as read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionTables {
    pub genes: Vec<GeneRecord>,
    pub compartments: Vec<CompartmentRecord>,
    pub metabolites: Vec<MetaboliteRecord>,
    pub reactions: Vec<ReactionRecord>,
}

impl ExtractionTables {
    /// Read the headerless export tables
    pub fn read(
        genes: &Path,
        compartments: &Path,
        metabolites: &Path,
        reactions: &Path,
        config: &CurationConfiguration,
    ) -> Result<Self, TableError> {
        let delimiter = config.table_delimiter;
        let tables = ExtractionTables {
            genes: read_table_from_path(genes, delimiter, Columns::Fixed(&GENE_COLUMNS))?,
            compartments: read_table_from_path(
                compartments,
                delimiter,
                Columns::Fixed(&COMPARTMENT_COLUMNS),
            )?,
            metabolites: read_table_from_path(
                metabolites,
                delimiter,
                Columns::Fixed(&METABOLITE_COLUMNS),
            )?,
            reactions: read_table_from_path(
                reactions,
                delimiter,
                Columns::Fixed(&REACTION_COLUMNS),
            )?,
        };
        info!(
            "Read {} gene, {} compartment, {} metabolite and {} reaction record(s)",
            tables.genes.len(),
            tables.compartments.len(),
            tables.metabolites.len(),
            tables.reactions.len()
        );
        Ok(tables)
    }
}
// endregion Export Tables

/// Problems found in single records, none of them stop the extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The reaction is skipped
    #[error("Reaction {reaction} has a malformed equation: {source}")]
    MalformedEquation {
        reaction: String,
        source: EquationParseError,
    },
    /// The reaction is kept with no genes
    #[error("Reaction {reaction} has no gene record")]
    MissingReferenceRecord { reaction: String },
    /// The field is left unknown
    #[error("{entity} has an invalid {field}: `{value}`")]
    InvalidField {
        entity: String,
        field: &'static str,
        value: String,
    },
    /// The first record with the identifier is kept
    #[error("Duplicate identifier {id} in the {table} table")]
    DuplicateIdentifier { table: &'static str, id: String },
    /// The reaction is kept, curation rejects the model until the reference is resolved
    #[error("Extracted {0}")]
    DanglingReference(DanglingReference),
}

/// Extracted model together with every per-record problem
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub model: Model,
    pub errors: Vec<ExtractionError>,
}

/// Report an identifier already extracted, the first record keeps it
fn is_duplicate<T>(
    entities: &IndexMap<String, T>,
    id: &str,
    table: &'static str,
    errors: &mut Vec<ExtractionError>,
) -> bool {
    if !entities.contains_key(id) {
        return false;
    }
    warn!("Duplicate {} identifier {}, keeping the first", table, id);
    errors.push(ExtractionError::DuplicateIdentifier {
        table,
        id: id.to_string(),
    });
    true
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a numeric field, empty is unknown and unparsable is reported then unknown
fn numeric<T: std::str::FromStr>(
    entity: &str,
    field: &'static str,
    value: &str,
    errors: &mut Vec<ExtractionError>,
) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("{} has an invalid {} `{}`", entity, field, value);
            errors.push(ExtractionError::InvalidField {
                entity: entity.to_string(),
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

pub fn extract_compartments(
    records: &[CompartmentRecord],
) -> (IndexMap<String, Compartment>, Vec<ExtractionError>) {
    let mut compartments = IndexMap::new();
    let mut errors = Vec::new();
    for record in records {
        if is_duplicate(&compartments, &record.identifier, "compartments", &mut errors) {
            continue;
        }
        let compartment = Compartment::new(&record.identifier, &record.name);
        compartments.insert(record.identifier.clone(), compartment);
    }
    (compartments, errors)
}

fn metabolite_references(
    record: &MetaboliteRecord,
    config: &CurationConfiguration,
) -> IndexMap<String, Vec<String>> {
    let mut references = IndexMap::new();
    let mut prior = vec![record.identifier.clone()];
    prior.extend(parse_references(&record.reference, &config.prior_identifier_key));
    references.insert(config.prior_identifier_category.clone(), prior);
    for (category, key) in &config.metabolite_reference_keys {
        references.insert(category.clone(), parse_references(&record.reference, key));
    }
    references
}

/// Metabolites keyed by identifier, with their external references by category
///
/// The metabolite's own identifier leads its prior identifier category.
pub fn extract_metabolites(
    records: &[MetaboliteRecord],
    config: &CurationConfiguration,
) -> (IndexMap<String, Metabolite>, Vec<ExtractionError>) {
    let mut metabolites = IndexMap::new();
    let mut errors = Vec::new();
    for record in records {
        let id = record.identifier.as_str();
        if is_duplicate(&metabolites, id, "metabolites", &mut errors) {
            continue;
        }
        let metabolite = Metabolite {
            id: id.to_string(),
            name: optional(&record.name),
            formula: optional(&record.formula),
            mass: numeric(id, "mass", &record.mass, &mut errors),
            charge: numeric(id, "charge", &record.charge, &mut errors),
            references: metabolite_references(record, config),
        };
        debug!("Extracted metabolite {}", id);
        metabolites.insert(id.to_string(), metabolite);
    }
    (metabolites, errors)
}

fn reaction_references(
    record: &ReactionRecord,
    config: &CurationConfiguration,
) -> IndexMap<String, Vec<String>> {
    let mut references = IndexMap::new();
    references.insert(
        config.native_identifier_category.clone(),
        split_list(&record.recon2m2, &config.list_separator),
    );
    for (category, key) in &config.reaction_reference_keys {
        references.insert(category.clone(), parse_references(&record.reference, key));
    }
    let mut prior: Vec<String> = optional(&record.metanetx).into_iter().collect();
    prior.extend(parse_references(&record.reference, &config.prior_identifier_key));
    references.insert(config.prior_identifier_category.clone(), prior);
    references.insert(
        config.enzyme_commission_category.clone(),
        split_list(&record.enzyme_commission, &config.list_separator),
    );
    references
}

/// Reactions keyed by identifier
///
/// A reaction whose equation does not parse is skipped. A reaction without a gene record is
/// kept with no genes. Only the first gene record of each reaction is used.
pub fn extract_reactions(
    records: &[ReactionRecord],
    genes: &[GeneRecord],
    config: &CurationConfiguration,
) -> (IndexMap<String, Reaction>, Vec<ExtractionError>) {
    let mut gene_index: IndexMap<&str, &GeneRecord> = IndexMap::new();
    for gene in genes {
        gene_index.entry(gene.reaction.as_str()).or_insert(gene);
    }

    let mut reactions = IndexMap::new();
    let mut errors = Vec::new();
    for record in records {
        let id = record.identifier.as_str();
        if is_duplicate(&reactions, id, "reactions", &mut errors) {
            continue;
        }
        let parsed = match parse_equation(&record.equation) {
            Ok(parsed) => parsed,
            Err(source) => {
                warn!("Skipping reaction {}: {}", id, source);
                errors.push(ExtractionError::MalformedEquation {
                    reaction: id.to_string(),
                    source,
                });
                continue;
            }
        };
        let genes = match gene_index.get(id) {
            Some(gene) => split_list(&gene.genes, &config.list_separator),
            None => {
                warn!("Reaction {} has no gene record", id);
                errors.push(ExtractionError::MissingReferenceRecord {
                    reaction: id.to_string(),
                });
                Vec::new()
            }
        };
        let reaction = Reaction {
            id: id.to_string(),
            name: None,
            equation: record.equation.clone(),
            reversibility: parsed.reversibility,
            participants: parsed.participants,
            processes: parse_references(&record.process, &config.process_key),
            genes,
            references: reaction_references(record, config),
            replicates: Vec::new(),
        };
        debug!("Extracted reaction {}", id);
        reactions.insert(id.to_string(), reaction);
    }
    (reactions, errors)
}

/// Extract compartments, metabolites and reactions into one model
///
/// # Examples
/// ```rust
/// use reconrs_core::configuration::CurationConfiguration;
/// use reconrs_core::extraction::{extract_model, ExtractionTables, ReactionRecord};
/// let tables = ExtractionTables {
///     reactions: vec![ReactionRecord {
///         identifier: "R_BAD".to_string(),
///         equation: "A@c B@c".to_string(),
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
/// let report = extract_model(&tables, &CurationConfiguration::default());
/// assert!(report.model.reactions.is_empty());
/// assert_eq!(report.errors.len(), 1);
/// ```
pub fn extract_model(
    tables: &ExtractionTables,
    config: &CurationConfiguration,
) -> ExtractionReport {
    let (compartments, mut errors) = extract_compartments(&tables.compartments);
    let (metabolites, metabolite_errors) = extract_metabolites(&tables.metabolites, config);
    errors.extend(metabolite_errors);
    let (reactions, reaction_errors) = extract_reactions(&tables.reactions, &tables.genes, config);
    errors.extend(reaction_errors);

    let model = Model {
        compartments,
        metabolites,
        reactions,
    };
    for dangling in model.dangling_references() {
        warn!("Extracted {}", dangling);
        errors.push(ExtractionError::DanglingReference(dangling));
    }
    info!(
        "Extracted {} compartment(s), {} metabolite(s) and {} reaction(s) with {} problem(s)",
        model.compartments.len(),
        model.metabolites.len(),
        model.reactions.len(),
        errors.len()
    );
    ExtractionReport { model, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::equation_parse::parser::ParseError;
    use crate::metabolic_model::reaction::Role;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("extraction")
            .join(name)
    }

    fn read_tables() -> ExtractionTables {
        ExtractionTables::read(
            &fixture("genes.tsv"),
            &fixture("compartments.tsv"),
            &fixture("metabolites.tsv"),
            &fixture("reactions.tsv"),
            &CurationConfiguration::default(),
        )
        .unwrap()
    }

    #[test]
    fn read_export_tables() {
        let tables = read_tables();
        assert_eq!(tables.genes.len(), 3);
        assert_eq!(tables.compartments.len(), 3);
        assert_eq!(tables.metabolites.len(), 7);
        assert_eq!(tables.reactions.len(), 4);
        assert_eq!(tables.compartments[2].source, "");
        assert_eq!(tables.reactions[1].enzyme_commission, "2.7.1.1;2.7.1.2");
    }

    #[test]
    fn metabolites_with_references() {
        let report = extract_model(&read_tables(), &CurationConfiguration::default());
        let glucose = &report.model.metabolites["MNXM41"];
        assert_eq!(glucose.name.as_deref(), Some("D-glucose"));
        assert_eq!(glucose.formula.as_deref(), Some("C6H12O6"));
        assert_eq!(glucose.mass, Some(180.06339));
        assert_eq!(glucose.charge, Some(0));
        assert_eq!(glucose.references["metanetx"], vec!["MNXM41", "MNXM99"]);
        assert_eq!(glucose.references["chebi"], vec!["4167"]);
        assert_eq!(glucose.references["kegg"], vec!["C00031"]);
        assert_eq!(glucose.references["bigg"], vec!["glc__D"]);
        assert!(glucose.references["hmdb"].is_empty());
        assert_eq!(report.model.metabolites["MNXM3"].charge, Some(-4));
    }

    #[test]
    fn invalid_numbers_and_duplicates() {
        let report = extract_model(&read_tables(), &CurationConfiguration::default());
        let unknown = &report.model.metabolites["MNXM160"];
        assert_eq!(unknown.mass, None);
        assert_eq!(unknown.charge, None);
        assert_eq!(unknown.formula, None);
        assert!(report.errors.contains(&ExtractionError::InvalidField {
            entity: "MNXM160".to_string(),
            field: "mass",
            value: "heavy".to_string(),
        }));
        assert!(report.errors.contains(&ExtractionError::InvalidField {
            entity: "MNXM160".to_string(),
            field: "charge",
            value: "one".to_string(),
        }));
        assert!(report.errors.contains(&ExtractionError::DuplicateIdentifier {
            table: "metabolites",
            id: "MNXM41".to_string(),
        }));
        // the first glucose record wins
        assert_eq!(
            report.model.metabolites["MNXM41"].name.as_deref(),
            Some("D-glucose")
        );
        assert_eq!(report.model.metabolites.len(), 6);
    }

    #[test]
    fn reactions_with_references_and_genes() {
        let report = extract_model(&read_tables(), &CurationConfiguration::default());
        let hexokinase = &report.model.reactions["R_HEX1"];
        assert!(!hexokinase.reversibility);
        assert_eq!(hexokinase.participants.len(), 5);
        assert_eq!(hexokinase.participants_by_role(Role::Reactant).count(), 2);
        assert_eq!(hexokinase.genes, vec!["HGNC:4922", "HGNC:4923"]);
        assert_eq!(hexokinase.processes, vec!["Glycolysis/gluconeogenesis"]);
        assert_eq!(hexokinase.references["recon2m2"], vec!["HEX1"]);
        assert_eq!(
            hexokinase.references["metanetx"],
            vec!["MNXR100765", "MNXR1"]
        );
        assert_eq!(
            hexokinase.references["enzyme_commission"],
            vec!["2.7.1.1", "2.7.1.2"]
        );
        assert_eq!(hexokinase.references["kegg"], vec!["R00299"]);

        let transport = &report.model.reactions["R_GLCt"];
        assert_eq!(transport.references["recon2m2"], vec!["GLCt1", "GLCt1r"]);
        assert_eq!(transport.references["rhea"], vec!["12345"]);
        assert!(transport.references["enzyme_commission"].is_empty());
        assert_eq!(transport.processes, vec!["Transport, extracellular"]);
        assert_eq!(transport.genes, vec!["HGNC:11005"]);
    }

    #[test]
    fn malformed_equation_is_scoped_to_its_reaction() {
        let report = extract_model(&read_tables(), &CurationConfiguration::default());
        assert!(!report.model.reactions.contains_key("R_BAD"));
        assert_eq!(
            report.model.reactions.keys().collect::<Vec<_>>(),
            vec!["R_GLCt", "R_HEX1", "R_H2Ot"]
        );
        assert!(report.errors.contains(&ExtractionError::MalformedEquation {
            reaction: "R_BAD".to_string(),
            source: EquationParseError::ParsingError(ParseError::MissingDirection),
        }));
        assert!(report.model.check_integrity().is_ok());
    }

    #[test]
    fn missing_gene_record_keeps_reaction() {
        let report = extract_model(&read_tables(), &CurationConfiguration::default());
        let water = &report.model.reactions["R_H2Ot"];
        assert!(water.reversibility);
        assert!(water.genes.is_empty());
        assert!(report.errors.contains(&ExtractionError::MissingReferenceRecord {
            reaction: "R_H2Ot".to_string(),
        }));
        // the skipped reaction does not also report missing genes
        assert!(!report.errors.contains(&ExtractionError::MissingReferenceRecord {
            reaction: "R_BAD".to_string(),
        }));
        assert_eq!(report.errors.len(), 5);
    }

    #[test]
    fn native_identifiers_split_on_separator() {
        let record = ReactionRecord {
            identifier: "MNXR1".to_string(),
            recon2m2: "HEX1;r0355".to_string(),
            ..Default::default()
        };
        let config = CurationConfiguration::default();
        let references = reaction_references(&record, &config);
        assert_eq!(
            references[&config.native_identifier_category],
            vec!["HEX1", "r0355"]
        );
    }

    #[test]
    fn dangling_participants_are_reported() {
        let tables = ExtractionTables {
            genes: vec![GeneRecord {
                reaction: "R_GHOST".to_string(),
                genes: "HGNC:1".to_string(),
                ..Default::default()
            }],
            compartments: vec![CompartmentRecord {
                identifier: "c".to_string(),
                name: "cytosol".to_string(),
                source: String::new(),
            }],
            metabolites: vec![MetaboliteRecord {
                identifier: "A".to_string(),
                ..Default::default()
            }],
            reactions: vec![ReactionRecord {
                identifier: "R_GHOST".to_string(),
                equation: "1 A@c --> 1 GHOST@x".to_string(),
                ..Default::default()
            }],
        };
        let report = extract_model(&tables, &CurationConfiguration::default());
        assert!(report.model.reactions.contains_key("R_GHOST"));
        assert_eq!(
            report.errors,
            vec![
                ExtractionError::DanglingReference(DanglingReference::Metabolite {
                    reaction: "R_GHOST".to_string(),
                    metabolite: "GHOST".to_string(),
                }),
                ExtractionError::DanglingReference(DanglingReference::Compartment {
                    reaction: "R_GHOST".to_string(),
                    compartment: "x".to_string(),
                }),
            ]
        );
        assert!(report.model.check_integrity().is_err());
    }

    #[test]
    fn compartments() {
        let records = vec![
            CompartmentRecord {
                identifier: "MNXC3".to_string(),
                name: "cytoplasm".to_string(),
                source: String::new(),
            },
            CompartmentRecord {
                identifier: "MNXC3".to_string(),
                name: "cytosol".to_string(),
                source: String::new(),
            },
        ];
        let (compartments, errors) = extract_compartments(&records);
        assert_eq!(compartments["MNXC3"].name, "cytoplasm");
        assert_eq!(errors.len(), 1);
    }
}
