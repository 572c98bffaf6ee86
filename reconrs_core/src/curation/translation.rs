//! Translate and merge metabolite identifiers across the structured model
use indexmap::IndexMap;
use log::info;

use crate::configuration::CurationConfiguration;
use crate::curation::substitution::{TranslationReport, Translator};
use crate::curation::{CurationError, TranslationRow};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;

/// Rewrite metabolite identifiers, in metabolites and participants alike, per a translation
/// table
///
/// Rows apply in table order, so a later row sees the identifiers written by earlier ones.
/// Metabolites ending up with the same identifier are merged: the metabolite which already
/// carried that identifier survives (or the first one if none did), takes the position of the
/// first of them, and gains the references of the others.
///
/// # Examples
/// ```rust
/// use reconrs_core::configuration::CurationConfiguration;
/// use reconrs_core::curation::{translate_identifiers, TranslationRow};
/// use reconrs_core::metabolic_model::metabolite::Metabolite;
/// use reconrs_core::metabolic_model::model::Model;
/// let mut model = Model::new_empty();
/// model.add_metabolite(Metabolite::new_id_only("MNXM1"));
/// let rows = vec![TranslationRow::new("MNXM1", "MNXM01")];
/// let (translated, report) =
///     translate_identifiers(&model, &rows, &CurationConfiguration::default()).unwrap();
/// assert!(translated.metabolites.contains_key("MNXM01"));
/// assert!(report.unmatched.is_empty());
/// ```
pub fn translate_identifiers(
    model: &Model,
    rows: &[TranslationRow],
    config: &CurationConfiguration,
) -> Result<(Model, TranslationReport), CurationError> {
    let mut translator = Translator::new(rows, &config.translation_delimiter);

    let mut groups: IndexMap<String, Vec<&Metabolite>> = IndexMap::new();
    for metabolite in model.metabolites.values() {
        let translated = translator.translate(&metabolite.id);
        groups.entry(translated).or_default().push(metabolite);
    }

    let mut metabolites = IndexMap::new();
    for (identifier, members) in groups {
        let survivor_index = members
            .iter()
            .position(|m| m.id == identifier)
            .unwrap_or(0);
        let mut survivor = members[survivor_index].clone();
        survivor.id = identifier.clone();
        for (index, member) in members.iter().enumerate() {
            if index != survivor_index {
                survivor.absorb_references(member);
                translator.record_merge(&member.id, &identifier);
            }
        }
        metabolites.insert(identifier, survivor);
    }

    let mut reactions = model.reactions.clone();
    for reaction in reactions.values_mut() {
        for participant in reaction.participants.iter_mut() {
            participant.metabolite_id = translator.translate(&participant.metabolite_id);
        }
    }

    let report = translator.finish(config.reject_ambiguous_substitutions)?;
    let translated = Model {
        compartments: model.compartments.clone(),
        metabolites,
        reactions,
    };
    translated.check_integrity()?;
    info!(
        "Translated {} identifier(s), merged {} metabolite(s), {} metabolite(s) remain",
        report.rewritten.len(),
        report.merged.len(),
        translated.metabolites.len()
    );
    Ok((translated, report))
}
