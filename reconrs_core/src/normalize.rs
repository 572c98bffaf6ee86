//! Structural normalization of an SBML model tree
//!
//! Every stage takes the indexed model by reference, edits a copy and returns the re-indexed
//! copy. The stages must run as compartment renames and boundary rewrite, then prefix
//! stripping, then identifier translation (see [`crate::pipeline`]).
use indexmap::IndexSet;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use crate::configuration::CurationConfiguration;
use crate::curation::substitution::{TranslationReport, Translator};
use crate::curation::{CurationError, TranslationRow};
use crate::io::sbml::{Element, SbmlEdit, Section, SbmlError, SbmlModel, TreeDanglingReference};

const ABOUT: &str = "about";
const SPECIES_ATTRIBUTE: &str = "species";
const COMPARTMENT_ATTRIBUTE: &str = "compartment";

/// Errors from normalizing a model tree
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Unable to re-index the normalized model: {0}")]
    Sbml(#[from] SbmlError),
    #[error("Invalid boundary pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Unable to translate identifiers: {0}")]
    Translation(#[from] CurationError),
    /// Species or species references point at components missing from the normalized tree
    #[error("Normalized model has {} dangling reference(s)", .0.len())]
    DanglingReferences(Vec<TreeDanglingReference>),
}

/// Re-index an edited tree, rejecting it if any reference dangles
fn finish_checked(edit: SbmlEdit) -> Result<SbmlModel, NormalizeError> {
    let model = edit.finish()?;
    let dangling = model.dangling_references();
    if dangling.is_empty() {
        Ok(model)
    } else {
        Err(NormalizeError::DanglingReferences(dangling))
    }
}

/// Rewrite every `about` attribute in a species' annotation that points at the species itself
fn rewrite_about<F: Fn(&str) -> Option<String>>(species: &mut Element, marker: &str, rewrite: &F) {
    species.for_each_descendant_mut(&mut |element: &mut Element| {
        if element.local_name() != "Description" {
            return;
        }
        let Some((key, value)) = element
            .attributes
            .iter()
            .find(|(key, _)| crate::io::sbml::element::local_name(key) == ABOUT)
            .map(|(key, value)| (key.clone(), value.clone()))
        else {
            return;
        };
        let Some(identifier) = value.strip_prefix(marker) else {
            return;
        };
        if let Some(rewritten) = rewrite(identifier) {
            element.set_attribute(&key, &format!("{}{}", marker, rewritten));
        }
    });
}

/// Set the name of compartment `id`, if the model has one
pub fn rename_compartment(
    model: &SbmlModel,
    id: &str,
    name: &str,
) -> Result<SbmlModel, NormalizeError> {
    let mut edit = model.edit();
    for compartment in edit.items_mut(Section::Compartments) {
        if compartment.id() == Some(id) {
            compartment.set_attribute("name", name);
            debug!("Named compartment {} {}", id, name);
        }
    }
    finish_checked(edit)
}

/// Name the boundary and extracellular compartments
pub fn rename_compartments(
    model: &SbmlModel,
    config: &CurationConfiguration,
) -> Result<SbmlModel, NormalizeError> {
    let renamed = rename_compartment(
        model,
        &config.boundary_compartment,
        &config.boundary_compartment_name,
    )?;
    rename_compartment(
        &renamed,
        &config.extracellular_compartment,
        &config.extracellular_compartment_name,
    )
}

/// Pattern matching `<base>_<letter>_boundary`, capturing `<base>`
pub fn boundary_pattern(config: &CurationConfiguration) -> Result<Regex, regex::Error> {
    let letters: String = config
        .boundary_compartment_letters
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!("^(?P<base>.+)_[{}]_boundary$", letters))
}

/// Move boundary species into the boundary compartment
///
/// A species `<base>_<letter>_boundary` becomes `<base>_<boundary>` and is placed in the
/// boundary compartment. Species references and annotation `about` attributes follow.
pub fn rewrite_boundary(
    model: &SbmlModel,
    config: &CurationConfiguration,
) -> Result<SbmlModel, NormalizeError> {
    let pattern = boundary_pattern(config)?;
    let replacement = format!("${{base}}_{}", config.boundary_compartment);
    let rewrite = |identifier: &str| -> Option<String> {
        if pattern.is_match(identifier) {
            Some(pattern.replace(identifier, replacement.as_str()).into_owned())
        } else {
            None
        }
    };

    let mut edit = model.edit();
    let mut rewritten = 0;
    for species in edit.items_mut(Section::Species) {
        let Some(novel) = species.id().and_then(|id| rewrite(id)) else {
            continue;
        };
        debug!("Moved {:?} to boundary as {}", species.id(), novel);
        species.set_attribute("id", &novel);
        species.set_attribute(COMPARTMENT_ATTRIBUTE, &config.boundary_compartment);
        rewrite_about(species, &config.annotation_marker, &rewrite);
        rewritten += 1;
    }
    for reference in edit.species_references_mut() {
        if let Some(novel) = reference.attribute(SPECIES_ATTRIBUTE).and_then(|s| rewrite(s)) {
            reference.set_attribute(SPECIES_ATTRIBUTE, &novel);
        }
    }
    info!("Moved {} species to the boundary compartment", rewritten);
    finish_checked(edit)
}

/// Trim every leading repetition of `prefix`
fn strip(identifier: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    let stripped = identifier.trim_start_matches(prefix);
    if stripped.len() == identifier.len() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Remove the species prefix from species ids, species references and annotation `about`
/// attributes
///
/// Every leading repetition is removed, so stripping twice changes nothing more.
pub fn strip_prefix(
    model: &SbmlModel,
    config: &CurationConfiguration,
) -> Result<SbmlModel, NormalizeError> {
    let prefix = config.species_prefix.as_str();
    let rewrite = |identifier: &str| strip(identifier, prefix);

    let mut edit = model.edit();
    let mut stripped = 0;
    for species in edit.items_mut(Section::Species) {
        if let Some(novel) = species.id().and_then(|id| rewrite(id)) {
            species.set_attribute("id", &novel);
            stripped += 1;
        }
        rewrite_about(species, &config.annotation_marker, &rewrite);
    }
    for reference in edit.species_references_mut() {
        if let Some(novel) = reference.attribute(SPECIES_ATTRIBUTE).and_then(|s| rewrite(s)) {
            reference.set_attribute(SPECIES_ATTRIBUTE, &novel);
        }
    }
    info!("Stripped prefix {} from {} species", prefix, stripped);
    finish_checked(edit)
}

/// Translate species identifiers per a translation table
///
/// Species references and annotation `about` attributes follow their species. When a species
/// ends up with the identifier of an earlier species, the later one is dropped.
pub fn translate_species(
    model: &SbmlModel,
    rows: &[TranslationRow],
    config: &CurationConfiguration,
) -> Result<(SbmlModel, TranslationReport), NormalizeError> {
    let mut translator = Translator::new(rows, &config.translation_delimiter);
    let mut edit = model.edit();

    // (original, translated) for every species in document order
    let mut identifiers: Vec<(String, String)> = Vec::new();
    for species in edit.items_mut(Section::Species) {
        let Some(identifier) = species.id().map(str::to_string) else {
            continue;
        };
        let novel = translator.translate(&identifier);
        if novel != identifier {
            species.set_attribute("id", &novel);
            let marker = config.annotation_marker.as_str();
            rewrite_about(species, marker, &|about: &str| {
                (about == identifier).then(|| novel.clone())
            });
        }
        identifiers.push((identifier, novel));
    }
    for reference in edit.species_references_mut() {
        if let Some(species) = reference.attribute(SPECIES_ATTRIBUTE).map(str::to_string) {
            let novel = translator.translate(&species);
            reference.set_attribute(SPECIES_ATTRIBUTE, &novel);
        }
    }

    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut dropped = 0;
    for (original, novel) in &identifiers {
        if !seen.insert(novel.as_str()) {
            translator.record_merge(original, novel);
            dropped += 1;
        }
    }
    let mut kept: IndexSet<String> = IndexSet::new();
    edit.retain_items(Section::Species, |species| match species.id() {
        Some(identifier) => kept.insert(identifier.to_string()),
        None => true,
    });

    let report = translator.finish(config.reject_ambiguous_substitutions)?;
    let translated = finish_checked(edit)?;
    info!(
        "Translated {} species identifier(s), dropped {} duplicate species",
        report.rewritten.len(),
        dropped
    );
    Ok((translated, report))
}
