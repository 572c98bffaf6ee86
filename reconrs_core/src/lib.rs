//! Core rust implementation of Recon.rs, a crate for curating and reconciling genome scale
//! metabolic network models.
//!
//! Two paths run independently. The tree path normalizes an SBML model
//! ([`normalize`], driven by [`pipeline::NormalizationPipeline`]). The structured path extracts
//! a [`metabolic_model::model::Model`] from MetaNetX export tables ([`extraction`]) and applies
//! curator edit tables to it ([`curation`], driven by [`pipeline::CurationPipeline`]).

pub mod configuration;
pub mod curation;
pub mod extraction;
pub mod io;
pub mod metabolic_model;
pub mod normalize;
pub mod pipeline;
mod utils;
