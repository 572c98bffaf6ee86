//! Remove metabolites and reactions named by curator tables
use log::{debug, info};

use crate::curation::{CurationError, MetaboliteRemovalRow, ReactionRemovalRow};
use crate::metabolic_model::model::Model;

/// Delete metabolites, pointing the participants that referenced them at a replacement
///
/// Removing an absent metabolite is not an error. Every reaction is scanned for each row, so a
/// replacement written by an earlier row is rewritten again if a later row removes it. A row
/// without a replacement leaves participants untouched, which then fails the integrity check
/// if any reaction still uses the metabolite.
pub fn remove_metabolites(
    model: &Model,
    rows: &[MetaboliteRemovalRow],
) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for row in rows {
        if edited
            .metabolites
            .shift_remove(&row.removal_identifier)
            .is_some()
        {
            debug!("Removed metabolite {}", row.removal_identifier);
        }
        if row.replacement_identifier.is_empty() {
            continue;
        }
        for reaction in edited.reactions.values_mut() {
            for participant in reaction.participants.iter_mut() {
                if participant.metabolite_id == row.removal_identifier {
                    participant.metabolite_id = row.replacement_identifier.clone();
                }
            }
        }
    }
    edited.check_integrity()?;
    info!(
        "Removed metabolites, {} of {} remain",
        edited.metabolites.len(),
        model.metabolites.len()
    );
    Ok(edited)
}

/// Delete reactions along with their participants
pub fn remove_reactions(
    model: &Model,
    rows: &[ReactionRemovalRow],
) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for row in rows {
        if edited.reactions.shift_remove(&row.identifier).is_some() {
            debug!("Removed reaction {}", row.identifier);
        }
    }
    edited.check_integrity()?;
    info!(
        "Removed reactions, {} of {} remain",
        edited.reactions.len(),
        model.reactions.len()
    );
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::test_utils::setup_model;
    use crate::metabolic_model::model::DanglingReference;
    use proptest::prelude::*;

    #[test]
    fn remove_with_replacement() {
        let model = setup_model();
        let rows = vec![MetaboliteRemovalRow::new("MNXM3", "MNXM2")];
        let edited = remove_metabolites(&model, &rows).unwrap();
        assert!(!edited.metabolites.contains_key("MNXM3"));
        assert_eq!(edited.reactions["HEX1"].participants[1].metabolite_id, "MNXM2");
        assert!(model.metabolites.contains_key("MNXM3"));
    }

    #[test]
    fn remove_absent_is_noop() {
        let model = setup_model();
        let rows = vec![MetaboliteRemovalRow::new("MNXM404", "MNXM2")];
        assert_eq!(remove_metabolites(&model, &rows).unwrap(), model);
    }

    #[test]
    fn remove_without_replacement_dangles() {
        let model = setup_model();
        let rows = vec![MetaboliteRemovalRow::new("MNXM7", "")];
        let err = remove_metabolites(&model, &rows).unwrap_err();
        let CurationError::DanglingReferences(integrity) = err else {
            panic!("expected dangling references");
        };
        assert_eq!(
            integrity.dangling,
            vec![DanglingReference::Metabolite {
                reaction: "HEX1".to_string(),
                metabolite: "MNXM7".to_string()
            }]
        );
    }

    #[test]
    fn remove_with_missing_replacement_dangles() {
        let model = setup_model();
        let rows = vec![MetaboliteRemovalRow::new("MNXM7", "MNXM8")];
        assert!(matches!(
            remove_metabolites(&model, &rows),
            Err(CurationError::DanglingReferences(_))
        ));
    }

    #[test]
    fn unused_metabolite_removed_without_replacement() {
        let mut model = setup_model();
        model.reactions.shift_remove("H2Ot");
        let rows = vec![MetaboliteRemovalRow::new("MNXM2", "")];
        let edited = remove_metabolites(&model, &rows).unwrap();
        assert!(!edited.metabolites.contains_key("MNXM2"));
    }

    #[test]
    fn reactions_removed() {
        let model = setup_model();
        let rows = vec![
            ReactionRemovalRow {
                identifier: "GLCt".to_string(),
            },
            ReactionRemovalRow {
                identifier: "R404".to_string(),
            },
        ];
        let edited = remove_reactions(&model, &rows).unwrap();
        assert_eq!(edited.reactions.len(), 2);
        assert!(!edited.reactions.contains_key("GLCt"));
    }

    const IDS: [&str; 6] = ["MNXM1", "MNXM2", "MNXM41", "MNXM160", "MNXM3", "MNXM7"];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Whatever the table, a successful batch leaves no participant pointing at a missing
        /// metabolite and no removed metabolite behind
        #[test]
        fn removal_keeps_integrity(
            pairs in prop::collection::vec((0..IDS.len(), 0..=IDS.len()), 0..8)
        ) {
            let model = setup_model();
            let rows: Vec<MetaboliteRemovalRow> = pairs
                .iter()
                .map(|(removal, replacement)| MetaboliteRemovalRow::new(
                    IDS[*removal],
                    IDS.get(*replacement).copied().unwrap_or(""),
                ))
                .collect();
            match remove_metabolites(&model, &rows) {
                Ok(edited) => {
                    prop_assert!(edited.dangling_references().is_empty());
                    for reaction in edited.reactions.values() {
                        for participant in &reaction.participants {
                            prop_assert!(
                                edited.metabolites.contains_key(&participant.metabolite_id)
                            );
                        }
                    }
                    for row in &rows {
                        prop_assert!(!edited.metabolites.contains_key(&row.removal_identifier));
                    }
                }
                Err(err) => prop_assert!(matches!(err, CurationError::DanglingReferences(_))),
            }
        }

        /// Replacements that are never removed always give a consistent model
        #[test]
        fn removal_with_kept_replacement_succeeds(
            removals in prop::collection::vec(2..IDS.len(), 1..5)
        ) {
            let model = setup_model();
            // MNXM1 and MNXM2 are never removed
            let rows: Vec<MetaboliteRemovalRow> = removals
                .iter()
                .map(|removal| MetaboliteRemovalRow::new(IDS[*removal], IDS[removal % 2]))
                .collect();
            let edited = remove_metabolites(&model, &rows).unwrap();
            prop_assert!(edited.check_integrity().is_ok());
            for row in &rows {
                prop_assert!(!edited.metabolites.contains_key(&row.removal_identifier));
            }
        }
    }
}
