//! Literal field replacements on metabolites and reactions
use log::{debug, info};

use crate::configuration::CurationConfiguration;
use crate::curation::{CurationError, FieldOverrideRow};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;
use crate::utils::split_list;

fn malformed(index: usize, reason: String) -> CurationError {
    CurationError::MalformedEditTable {
        row: index + 1,
        reason,
    }
}

/// Empty values clear a field
fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn override_metabolite(
    metabolite: &mut Metabolite,
    row: &FieldOverrideRow,
    index: usize,
) -> Result<(), CurationError> {
    let value = row.value.trim();
    match row.field.as_str() {
        "name" => metabolite.name = optional(value),
        "formula" => metabolite.formula = optional(value),
        "mass" => {
            metabolite.mass = match optional(value) {
                Some(mass) => Some(mass.parse::<f64>().map_err(|_| {
                    malformed(index, format!("mass `{}` is not a number", value))
                })?),
                None => None,
            }
        }
        "charge" => {
            metabolite.charge = match optional(value) {
                Some(charge) => Some(charge.parse::<i32>().map_err(|_| {
                    malformed(index, format!("charge `{}` is not an integer", value))
                })?),
                None => None,
            }
        }
        field => {
            return Err(malformed(
                index,
                format!("unknown metabolite field `{}`", field),
            ))
        }
    }
    Ok(())
}

/// Replace `name`, `formula`, `mass` or `charge` of metabolites
///
/// An empty value clears the field. The whole table is rejected on the first row naming an
/// unknown metabolite or field, or holding a value that does not parse.
pub fn override_metabolite_fields(
    model: &Model,
    rows: &[FieldOverrideRow],
) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for (index, row) in rows.iter().enumerate() {
        let metabolite = edited.metabolites.get_mut(&row.identifier).ok_or_else(|| {
            malformed(index, format!("unknown metabolite `{}`", row.identifier))
        })?;
        override_metabolite(metabolite, row, index)?;
        debug!("Set {} of metabolite {}", row.field, row.identifier);
    }
    edited.check_integrity()?;
    info!("Applied {} metabolite field override(s)", rows.len());
    Ok(edited)
}

fn override_reaction(
    reaction: &mut Reaction,
    row: &FieldOverrideRow,
    index: usize,
    config: &CurationConfiguration,
) -> Result<(), CurationError> {
    let value = row.value.trim();
    match row.field.as_str() {
        "name" => reaction.name = optional(value),
        "processes" => reaction.processes = split_list(value, &config.list_separator),
        "genes" => reaction.genes = split_list(value, &config.list_separator),
        field => {
            return Err(malformed(
                index,
                format!("unknown reaction field `{}`", field),
            ))
        }
    }
    Ok(())
}

/// Replace `name`, `processes` or `genes` of reactions
///
/// List fields are split on the configured list separator.
pub fn override_reaction_fields(
    model: &Model,
    rows: &[FieldOverrideRow],
    config: &CurationConfiguration,
) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for (index, row) in rows.iter().enumerate() {
        let reaction = edited.reactions.get_mut(&row.identifier).ok_or_else(|| {
            malformed(index, format!("unknown reaction `{}`", row.identifier))
        })?;
        override_reaction(reaction, row, index, config)?;
        debug!("Set {} of reaction {}", row.field, row.identifier);
    }
    edited.check_integrity()?;
    info!("Applied {} reaction field override(s)", rows.len());
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::test_utils::setup_model;

    #[test]
    fn metabolite_fields() {
        let model = setup_model();
        let rows = vec![
            FieldOverrideRow::new("MNXM41", "name", "D-glucose"),
            FieldOverrideRow::new("MNXM41", "formula", "C6H12O6"),
            FieldOverrideRow::new("MNXM41", "mass", "180.06339"),
            FieldOverrideRow::new("MNXM41", "charge", "0"),
            FieldOverrideRow::new("MNXM1", "charge", "1"),
        ];
        let edited = override_metabolite_fields(&model, &rows).unwrap();
        let glucose = &edited.metabolites["MNXM41"];
        assert_eq!(glucose.name.as_deref(), Some("D-glucose"));
        assert_eq!(glucose.formula.as_deref(), Some("C6H12O6"));
        assert_eq!(glucose.mass, Some(180.06339));
        assert_eq!(glucose.charge, Some(0));
        assert_eq!(edited.metabolites["MNXM1"].charge, Some(1));
        assert_eq!(model.metabolites["MNXM41"].name, None);
    }

    #[test]
    fn empty_value_clears() {
        let model = setup_model();
        let set = vec![FieldOverrideRow::new("MNXM2", "name", "water")];
        let named = override_metabolite_fields(&model, &set).unwrap();
        let clear = vec![FieldOverrideRow::new("MNXM2", "name", "")];
        let cleared = override_metabolite_fields(&named, &clear).unwrap();
        assert_eq!(cleared.metabolites["MNXM2"].name, None);
    }

    #[test]
    fn unknown_field() {
        let model = setup_model();
        let rows = vec![
            FieldOverrideRow::new("MNXM41", "name", "glucose"),
            FieldOverrideRow::new("MNXM41", "colour", "blue"),
        ];
        match override_metabolite_fields(&model, &rows) {
            Err(CurationError::MalformedEditTable { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("colour"));
            }
            _ => panic!("expected a malformed edit table"),
        }
    }

    #[test]
    fn unknown_identifier_and_bad_value() {
        let model = setup_model();
        let unknown = vec![FieldOverrideRow::new("MNXM404", "name", "x")];
        assert!(matches!(
            override_metabolite_fields(&model, &unknown),
            Err(CurationError::MalformedEditTable { .. })
        ));
        let bad_charge = vec![FieldOverrideRow::new("MNXM1", "charge", "+one")];
        assert!(matches!(
            override_metabolite_fields(&model, &bad_charge),
            Err(CurationError::MalformedEditTable { .. })
        ));
    }

    #[test]
    fn reaction_fields() {
        let model = setup_model();
        let config = CurationConfiguration::default();
        let rows = vec![
            FieldOverrideRow::new("HEX1", "name", "hexokinase"),
            FieldOverrideRow::new("HEX1", "genes", "HGNC:4922;HGNC:4923"),
            FieldOverrideRow::new("HEX1", "processes", "glycolysis"),
        ];
        let edited = override_reaction_fields(&model, &rows, &config).unwrap();
        let hexokinase = &edited.reactions["HEX1"];
        assert_eq!(hexokinase.name.as_deref(), Some("hexokinase"));
        assert_eq!(hexokinase.genes, vec!["HGNC:4922", "HGNC:4923"]);
        assert_eq!(hexokinase.processes, vec!["glycolysis"]);

        let bad = vec![FieldOverrideRow::new("HEX1", "equation", "A@c --> B@c")];
        assert!(matches!(
            override_reaction_fields(&model, &bad, &config),
            Err(CurationError::MalformedEditTable { row: 1, .. })
        ));
    }
}
