//! Entity changes, reaction name enrichment and derived reaction annotations
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::configuration::CurationConfiguration;
use crate::curation::{ChangeKind, ChangeRow, CurationError};
use crate::metabolic_model::model::Model;
use crate::utils::union_preserving_order;

fn ignore(entity: &str, row: &ChangeRow) {
    warn!(
        "{} change {} -> {} neither renames nor replaces, ignored",
        entity, row.identifier_original, row.identifier_novel
    );
}

/// Rename or remove compartments
///
/// A row keeping the identifier but changing the name renames the compartment. A row keeping
/// the name but changing the identifier removes the compartment together with every reaction
/// that has a participant in it. Other rows are ignored.
pub fn change_compartments(model: &Model, rows: &[ChangeRow]) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for row in rows {
        match row.kind() {
            ChangeKind::Rename => {
                if let Some(compartment) = edited.compartments.get_mut(&row.identifier_original) {
                    debug!(
                        "Renamed compartment {} to {}",
                        row.identifier_original, row.name_novel
                    );
                    compartment.name = row.name_novel.clone();
                }
            }
            ChangeKind::Replace => {
                if edited
                    .compartments
                    .shift_remove(&row.identifier_original)
                    .is_none()
                {
                    continue;
                }
                let before = edited.reactions.len();
                edited
                    .reactions
                    .retain(|_, reaction| !reaction.involves_compartment(&row.identifier_original));
                debug!(
                    "Removed compartment {} and {} reaction(s) within it",
                    row.identifier_original,
                    before - edited.reactions.len()
                );
            }
            ChangeKind::Ignored => ignore("Compartment", row),
        }
    }
    edited.check_integrity()?;
    info!("{} compartment(s) remain", edited.compartments.len());
    Ok(edited)
}

/// Rename metabolites or fold them into another metabolite
///
/// A rename row sets the metabolite's name. A replace row removes the original metabolite and,
/// when the novel one exists, points the original's participants at it. Participants left on a
/// removed metabolite fail the integrity check.
pub fn change_metabolites(model: &Model, rows: &[ChangeRow]) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for row in rows {
        match row.kind() {
            ChangeKind::Rename => {
                if let Some(metabolite) = edited.metabolites.get_mut(&row.identifier_original) {
                    debug!(
                        "Renamed metabolite {} to {}",
                        row.identifier_original, row.name_novel
                    );
                    metabolite.name = Some(row.name_novel.clone());
                }
            }
            ChangeKind::Replace => {
                edited.metabolites.shift_remove(&row.identifier_original);
                if !edited.metabolites.contains_key(&row.identifier_novel) {
                    continue;
                }
                let mut redirected = 0;
                for reaction in edited.reactions.values_mut() {
                    for participant in reaction
                        .participants
                        .iter_mut()
                        .filter(|p| p.metabolite_id == row.identifier_original)
                    {
                        participant.metabolite_id = row.identifier_novel.clone();
                        redirected += 1;
                    }
                }
                debug!(
                    "Replaced metabolite {} with {} in {} participant(s)",
                    row.identifier_original, row.identifier_novel, redirected
                );
            }
            ChangeKind::Ignored => ignore("Metabolite", row),
        }
    }
    edited.check_integrity()?;
    info!("{} metabolite(s) remain", edited.metabolites.len());
    Ok(edited)
}

/// Rename or remove processes
///
/// Reactions only carry process identifiers, so the process names travel separately in
/// `processes` (identifier to name) and come back updated. A replace row removes the original
/// process and, when the novel one exists, moves reactions over to it.
pub fn change_processes(
    model: &Model,
    processes: &IndexMap<String, String>,
    rows: &[ChangeRow],
) -> Result<(Model, IndexMap<String, String>), CurationError> {
    let mut edited = model.clone();
    let mut names = processes.clone();
    for row in rows {
        match row.kind() {
            ChangeKind::Rename => {
                if let Some(name) = names.get_mut(&row.identifier_original) {
                    debug!(
                        "Renamed process {} to {}",
                        row.identifier_original, row.name_novel
                    );
                    *name = row.name_novel.clone();
                }
            }
            ChangeKind::Replace => {
                names.shift_remove(&row.identifier_original);
                if !names.contains_key(&row.identifier_novel) {
                    continue;
                }
                for reaction in edited.reactions.values_mut() {
                    if !reaction.processes.contains(&row.identifier_original) {
                        continue;
                    }
                    let replaced: Vec<String> = reaction
                        .processes
                        .iter()
                        .map(|process| {
                            if *process == row.identifier_original {
                                row.identifier_novel.clone()
                            } else {
                                process.clone()
                            }
                        })
                        .collect();
                    reaction.processes = union_preserving_order([replaced.as_slice()]);
                }
                debug!(
                    "Replaced process {} with {}",
                    row.identifier_original, row.identifier_novel
                );
            }
            ChangeKind::Ignored => ignore("Process", row),
        }
    }
    edited.check_integrity()?;
    info!("{} process(es) remain", names.len());
    Ok((edited, names))
}

/// Rename or remove reactions
pub fn change_reactions(model: &Model, rows: &[ChangeRow]) -> Result<Model, CurationError> {
    let mut edited = model.clone();
    for row in rows {
        match row.kind() {
            ChangeKind::Rename => {
                if let Some(reaction) = edited.reactions.get_mut(&row.identifier_original) {
                    debug!(
                        "Renamed reaction {} to {}",
                        row.identifier_original, row.name_novel
                    );
                    reaction.name = Some(row.name_novel.clone());
                }
            }
            ChangeKind::Replace => {
                if edited.reactions.shift_remove(&row.identifier_original).is_some() {
                    debug!("Removed reaction {}", row.identifier_original);
                }
            }
            ChangeKind::Ignored => ignore("Reaction", row),
        }
    }
    edited.check_integrity()?;
    info!("{} reaction(s) remain", edited.reactions.len());
    Ok(edited)
}

/// Name reactions after their counterpart in the native network
///
/// The first identifier of each reaction's native identifier category is looked up in
/// `names`, a reaction without a match gets an empty name.
pub fn enrich_reaction_names(
    model: &Model,
    names: &IndexMap<String, String>,
    config: &CurationConfiguration,
) -> Model {
    let mut edited = model.clone();
    let mut named = 0;
    for reaction in edited.reactions.values_mut() {
        let name = reaction
            .references
            .get(&config.native_identifier_category)
            .and_then(|identifiers| identifiers.first())
            .and_then(|identifier| names.get(identifier));
        match name {
            Some(name) => {
                reaction.name = Some(name.clone());
                named += 1;
            }
            None => reaction.name = Some(String::new()),
        }
    }
    info!("Named {} of {} reaction(s)", named, edited.reactions.len());
    edited
}

/// Add the processes a reaction serves by transporting one of their metabolites
///
/// A process spans, for each metabolite, the compartments its reactions place that metabolite
/// in. A reaction joins a process when it transports a metabolite between at least two of the
/// compartments the process spans for it.
pub fn include_reactions_transport_processes(model: &Model) -> Model {
    // process -> metabolite -> compartments
    let mut spans: IndexMap<&str, IndexMap<&str, Vec<&str>>> = IndexMap::new();
    for reaction in model.reactions.values() {
        for process in &reaction.processes {
            let metabolites = spans.entry(process.as_str()).or_default();
            for participant in &reaction.participants {
                let compartments = metabolites
                    .entry(participant.metabolite_id.as_str())
                    .or_default();
                if !compartments.contains(&participant.compartment_id.as_str()) {
                    compartments.push(&participant.compartment_id);
                }
            }
        }
    }
    for metabolites in spans.values_mut() {
        metabolites.retain(|_, compartments| compartments.len() > 1);
    }

    let mut edited = model.clone();
    let mut included = 0;
    for reaction in edited.reactions.values_mut() {
        let transports = reaction.transports();
        let mut joined: Vec<String> = Vec::new();
        for (process, metabolites) in &spans {
            let serves = transports.iter().any(|transport| {
                metabolites
                    .get(transport.metabolite.as_str())
                    .is_some_and(|spanned| {
                        transport
                            .compartments()
                            .iter()
                            .filter(|c| spanned.contains(&c.as_str()))
                            .count()
                            > 1
                    })
            });
            if serves {
                joined.push(process.to_string());
            }
        }
        let before = reaction.processes.len();
        reaction.processes =
            union_preserving_order([reaction.processes.as_slice(), joined.as_slice()]);
        included += reaction.processes.len() - before;
    }
    info!("Included {} transport process(es)", included);
    edited
}

/// Record, on each reaction, the reactions sharing its reactant and product metabolites
///
/// Every reaction lists its group in model order, itself included.
pub fn include_reactions_replications(model: &Model) -> Model {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for (id, reaction) in &model.reactions {
        let group = groups
            .iter_mut()
            .find(|group| model.reactions[&group[0]].same_metabolites(reaction));
        match group {
            Some(group) => group.push(id.clone()),
            None => groups.push(vec![id.clone()]),
        }
    }

    let mut edited = model.clone();
    for group in &groups {
        for id in group {
            if let Some(reaction) = edited.reactions.get_mut(id) {
                reaction.replicates = group.clone();
            }
        }
    }
    let replicated: usize = groups.iter().filter(|g| g.len() > 1).map(Vec::len).sum();
    info!("{} reaction(s) have replicates", replicated);
    edited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::test_utils::setup_model;
    use crate::metabolic_model::reaction::{Participant, ReactionBuilder, Role};

    fn change(
        identifier_original: &str,
        identifier_novel: &str,
        name_original: &str,
        name_novel: &str,
    ) -> ChangeRow {
        ChangeRow::new(identifier_original, identifier_novel, name_original, name_novel)
    }

    #[test]
    fn rename() {
        let model = setup_model();
        let rows = vec![change("c", "c", "cytosol", "cytoplasm")];
        let edited = change_compartments(&model, &rows).unwrap();
        assert_eq!(edited.compartments["c"].name, "cytoplasm");
        assert_eq!(edited.reactions.len(), model.reactions.len());
    }

    #[test]
    fn remove_with_reactions() {
        let model = setup_model();
        let rows = vec![change("e", "c", "extracellular region", "extracellular region")];
        let edited = change_compartments(&model, &rows).unwrap();
        assert!(!edited.compartments.contains_key("e"));
        assert_eq!(edited.reactions.keys().collect::<Vec<_>>(), vec!["HEX1"]);
        assert!(edited.check_integrity().is_ok());
    }

    #[test]
    fn ignored_rows() {
        let model = setup_model();
        let rows = vec![
            change("c", "c", "cytosol", "cytosol"),
            change("x", "x", "a", "b"),
            change("e", "m", "extracellular region", "mitochondrion"),
        ];
        assert_eq!(change_compartments(&model, &rows).unwrap(), model);
    }

    #[test]
    fn names_from_native_identifiers() {
        let mut model = setup_model();
        model
            .reactions
            .get_mut("HEX1")
            .unwrap()
            .references
            .insert(
                "recon2m2".to_string(),
                vec!["HEX1".to_string(), "r0355".to_string()],
            );
        let mut names = IndexMap::new();
        names.insert("HEX1".to_string(), "hexokinase (D-glucose:ATP)".to_string());
        names.insert("r0355".to_string(), "other".to_string());
        let edited = enrich_reaction_names(&model, &names, &CurationConfiguration::default());
        assert_eq!(
            edited.reactions["HEX1"].name.as_deref(),
            Some("hexokinase (D-glucose:ATP)")
        );
        assert_eq!(edited.reactions["GLCt"].name.as_deref(), Some(""));
    }

    #[test]
    fn metabolite_rename_and_replace() {
        let model = setup_model();
        let rows = vec![
            change("MNXM41", "MNXM41", "glucose", "D-glucose"),
            change("MNXM2", "MNXM1", "water", "water"),
        ];
        let edited = change_metabolites(&model, &rows).unwrap();
        assert_eq!(edited.metabolites["MNXM41"].name.as_deref(), Some("D-glucose"));
        assert!(!edited.metabolites.contains_key("MNXM2"));
        let h2ot: Vec<&str> = edited.reactions["H2Ot"]
            .participants
            .iter()
            .map(|p| p.metabolite_id.as_str())
            .collect();
        assert_eq!(h2ot, vec!["MNXM1", "MNXM1"]);
    }

    #[test]
    fn metabolite_replacement_must_exist() {
        let model = setup_model();
        let rows = vec![change("MNXM2", "MNXM9999", "water", "water")];
        assert!(matches!(
            change_metabolites(&model, &rows),
            Err(CurationError::DanglingReferences(_))
        ));
    }

    #[test]
    fn process_rename_and_replace() {
        let mut model = setup_model();
        model.reactions.get_mut("HEX1").unwrap().processes =
            vec!["glycolysis".to_string(), "hexose metabolism".to_string()];
        model.reactions.get_mut("GLCt").unwrap().processes = vec!["glycolysis".to_string()];
        let mut processes = IndexMap::new();
        processes.insert("glycolysis".to_string(), "glycolysis".to_string());
        processes.insert("hexose metabolism".to_string(), "hexose".to_string());
        let rows = vec![
            change("hexose metabolism", "hexose metabolism", "hexose", "hexose metabolism"),
            change("glycolysis", "hexose metabolism", "glycolysis", "glycolysis"),
        ];
        let (edited, names) = change_processes(&model, &processes, &rows).unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec![("hexose metabolism".to_string(), "hexose metabolism".to_string())]
        );
        assert_eq!(edited.reactions["HEX1"].processes, vec!["hexose metabolism"]);
        assert_eq!(edited.reactions["GLCt"].processes, vec!["hexose metabolism"]);
    }

    #[test]
    fn process_replacement_without_target_keeps_reactions() {
        let mut model = setup_model();
        model.reactions.get_mut("HEX1").unwrap().processes = vec!["glycolysis".to_string()];
        let mut processes = IndexMap::new();
        processes.insert("glycolysis".to_string(), "glycolysis".to_string());
        let rows = vec![change("glycolysis", "unknown", "glycolysis", "glycolysis")];
        let (edited, names) = change_processes(&model, &processes, &rows).unwrap();
        assert!(names.is_empty());
        assert_eq!(edited.reactions["HEX1"].processes, vec!["glycolysis"]);
    }

    #[test]
    fn reaction_rename_and_removal() {
        let model = setup_model();
        let rows = vec![
            change("HEX1", "HEX1", "", "hexokinase"),
            change("H2Ot", "H2Ot_old", "water transport", "water transport"),
            change("GLCt", "GLCt2", "a", "b"),
        ];
        let edited = change_reactions(&model, &rows).unwrap();
        assert_eq!(edited.reactions["HEX1"].name.as_deref(), Some("hexokinase"));
        assert_eq!(edited.reactions.keys().collect::<Vec<_>>(), vec!["GLCt", "HEX1"]);
    }

    #[test]
    fn transport_joins_process() {
        let mut model = setup_model();
        model.reactions.get_mut("HEX1").unwrap().processes = vec!["glycolysis".to_string()];
        model.add_reaction(
            ReactionBuilder::default()
                .id("HEX1e".to_string())
                .participants(vec![
                    Participant::new("MNXM41", "e", 1.0, Role::Reactant),
                    Participant::new("MNXM3", "e", 1.0, Role::Reactant),
                    Participant::new("MNXM160", "e", 1.0, Role::Product),
                ])
                .processes(vec!["glycolysis".to_string()])
                .build()
                .unwrap(),
        );
        let edited = include_reactions_transport_processes(&model);
        // glucose moves between e and c, both spanned by glycolysis
        assert_eq!(edited.reactions["GLCt"].processes, vec!["glycolysis"]);
        // water never appears in glycolysis
        assert!(edited.reactions["H2Ot"].processes.is_empty());
        assert_eq!(edited.reactions["HEX1"].processes, vec!["glycolysis"]);
    }

    #[test]
    fn transport_outside_process_compartments() {
        let mut model = setup_model();
        model.reactions.get_mut("HEX1").unwrap().processes = vec!["glycolysis".to_string()];
        let edited = include_reactions_transport_processes(&model);
        // glycolysis only places glucose in c
        assert!(edited.reactions["GLCt"].processes.is_empty());
    }

    #[test]
    fn replications() {
        let mut model = setup_model();
        model.add_reaction(
            ReactionBuilder::default()
                .id("GLCt2".to_string())
                .participants(vec![
                    Participant::new("MNXM41", "c", 1.0, Role::Reactant),
                    Participant::new("MNXM41", "e", 1.0, Role::Product),
                ])
                .build()
                .unwrap(),
        );
        let edited = include_reactions_replications(&model);
        assert_eq!(edited.reactions["GLCt"].replicates, vec!["GLCt", "GLCt2"]);
        assert_eq!(edited.reactions["GLCt2"].replicates, vec!["GLCt", "GLCt2"]);
        assert!(edited.reactions["GLCt"].is_replicated());
        assert_eq!(edited.reactions["HEX1"].replicates, vec!["HEX1"]);
        assert!(!edited.reactions["H2Ot"].is_replicated());
    }
}
