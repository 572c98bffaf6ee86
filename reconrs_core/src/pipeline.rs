//! Ordered stage lists for the tree path and the structured path
//!
//! Normalization stages declare the state of the model tree they need and the state they
//! leave it in, so a pipeline assembled in the wrong order is rejected before anything runs.
use indexmap::IndexMap;
use log::info;
use thiserror::Error;

use crate::configuration::CurationConfiguration;
use crate::curation::{
    change_compartments, change_metabolites, change_reactions, enrich_reaction_names,
    include_reactions_replications, include_reactions_transport_processes,
    override_metabolite_fields, override_reaction_fields, remove_metabolites, remove_reactions,
    translate_identifiers, ChangeRow, CurationError, FieldOverrideRow, MetaboliteRemovalRow,
    ReactionRemovalRow, TranslationReport, TranslationRow,
};
use crate::io::sbml::SbmlModel;
use crate::metabolic_model::model::Model;
use crate::normalize::{
    rename_compartments, rewrite_boundary, strip_prefix, translate_species, NormalizeError,
};

/// How far normalization has progressed, in running order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NormalizationState {
    Raw,
    /// Compartments named and boundary species moved
    Structured,
    /// Species prefix removed
    Stripped,
    /// Species identifiers translated
    Translated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationStage {
    RenameCompartments,
    RewriteBoundary,
    StripPrefix,
    TranslateIdentifiers(Vec<TranslationRow>),
}

impl NormalizationStage {
    pub fn name(&self) -> &'static str {
        match self {
            NormalizationStage::RenameCompartments => "rename compartments",
            NormalizationStage::RewriteBoundary => "rewrite boundary",
            NormalizationStage::StripPrefix => "strip prefix",
            NormalizationStage::TranslateIdentifiers(_) => "translate identifiers",
        }
    }

    /// State the tree must have reached before the stage runs
    pub fn requires(&self) -> NormalizationState {
        match self {
            NormalizationStage::RenameCompartments
            | NormalizationStage::RewriteBoundary
            | NormalizationStage::StripPrefix => NormalizationState::Raw,
            NormalizationStage::TranslateIdentifiers(_) => NormalizationState::Stripped,
        }
    }

    /// State the tree is in once the stage ran
    pub fn provides(&self) -> NormalizationState {
        match self {
            NormalizationStage::RenameCompartments | NormalizationStage::RewriteBoundary => {
                NormalizationState::Structured
            }
            NormalizationStage::StripPrefix => NormalizationState::Stripped,
            NormalizationStage::TranslateIdentifiers(_) => NormalizationState::Translated,
        }
    }
}

/// Stages run over an SBML model tree, in push order
#[derive(Debug, Clone)]
pub struct NormalizationPipeline {
    config: CurationConfiguration,
    stages: Vec<NormalizationStage>,
    state: NormalizationState,
}

impl NormalizationPipeline {
    pub fn new(config: CurationConfiguration) -> Self {
        NormalizationPipeline {
            config,
            stages: Vec::new(),
            state: NormalizationState::Raw,
        }
    }

    /// Every stage, translation last
    pub fn standard(
        config: CurationConfiguration,
        rows: Vec<TranslationRow>,
    ) -> Result<Self, PipelineError> {
        let mut pipeline = NormalizationPipeline::new(config);
        pipeline
            .push(NormalizationStage::RenameCompartments)?
            .push(NormalizationStage::RewriteBoundary)?
            .push(NormalizationStage::StripPrefix)?
            .push(NormalizationStage::TranslateIdentifiers(rows))?;
        Ok(pipeline)
    }

    /// Append a stage
    ///
    /// The stage is rejected if its prerequisite state has not been reached yet, or if the
    /// pipeline has already moved past the state the stage produces.
    pub fn push(&mut self, stage: NormalizationStage) -> Result<&mut Self, PipelineError> {
        if self.state < stage.requires() || self.state > stage.provides() {
            return Err(PipelineError::StageOrder {
                stage: stage.name(),
                state: self.state,
            });
        }
        self.state = self.state.max(stage.provides());
        self.stages.push(stage);
        Ok(self)
    }

    pub fn stages(&self) -> &[NormalizationStage] {
        &self.stages
    }

    /// Run every stage, returning the normalized tree and one report per translation stage
    pub fn run(
        &self,
        model: &SbmlModel,
    ) -> Result<(SbmlModel, Vec<TranslationReport>), PipelineError> {
        let mut current = model.clone();
        let mut reports = Vec::new();
        for stage in &self.stages {
            info!("Running normalization stage: {}", stage.name());
            current = match stage {
                NormalizationStage::RenameCompartments => {
                    rename_compartments(&current, &self.config)?
                }
                NormalizationStage::RewriteBoundary => rewrite_boundary(&current, &self.config)?,
                NormalizationStage::StripPrefix => strip_prefix(&current, &self.config)?,
                NormalizationStage::TranslateIdentifiers(rows) => {
                    let (translated, report) = translate_species(&current, rows, &self.config)?;
                    reports.push(report);
                    translated
                }
            };
        }
        Ok((current, reports))
    }
}

/// One batch of curator edits
#[derive(Debug, Clone, PartialEq)]
pub enum CurationStep {
    Translate(Vec<TranslationRow>),
    RemoveMetabolites(Vec<MetaboliteRemovalRow>),
    RemoveReactions(Vec<ReactionRemovalRow>),
    OverrideMetaboliteFields(Vec<FieldOverrideRow>),
    OverrideReactionFields(Vec<FieldOverrideRow>),
    ChangeCompartments(Vec<ChangeRow>),
    ChangeMetabolites(Vec<ChangeRow>),
    ChangeReactions(Vec<ChangeRow>),
    /// Reaction names keyed by native network identifier
    EnrichReactionNames(IndexMap<String, String>),
    IncludeTransportProcesses,
    IncludeReplications,
}

impl CurationStep {
    pub fn name(&self) -> &'static str {
        match self {
            CurationStep::Translate(_) => "translate identifiers",
            CurationStep::RemoveMetabolites(_) => "remove metabolites",
            CurationStep::RemoveReactions(_) => "remove reactions",
            CurationStep::OverrideMetaboliteFields(_) => "override metabolite fields",
            CurationStep::OverrideReactionFields(_) => "override reaction fields",
            CurationStep::ChangeCompartments(_) => "change compartments",
            CurationStep::ChangeMetabolites(_) => "change metabolites",
            CurationStep::ChangeReactions(_) => "change reactions",
            CurationStep::EnrichReactionNames(_) => "enrich reaction names",
            CurationStep::IncludeTransportProcesses => "include transport processes",
            CurationStep::IncludeReplications => "include replications",
        }
    }

    fn apply(
        &self,
        model: &Model,
        config: &CurationConfiguration,
        reports: &mut Vec<TranslationReport>,
    ) -> Result<Model, CurationError> {
        match self {
            CurationStep::Translate(rows) => {
                let (translated, report) = translate_identifiers(model, rows, config)?;
                reports.push(report);
                Ok(translated)
            }
            CurationStep::RemoveMetabolites(rows) => remove_metabolites(model, rows),
            CurationStep::RemoveReactions(rows) => remove_reactions(model, rows),
            CurationStep::OverrideMetaboliteFields(rows) => override_metabolite_fields(model, rows),
            CurationStep::OverrideReactionFields(rows) => {
                override_reaction_fields(model, rows, config)
            }
            CurationStep::ChangeCompartments(rows) => change_compartments(model, rows),
            CurationStep::ChangeMetabolites(rows) => change_metabolites(model, rows),
            CurationStep::ChangeReactions(rows) => change_reactions(model, rows),
            CurationStep::EnrichReactionNames(names) => {
                Ok(enrich_reaction_names(model, names, config))
            }
            CurationStep::IncludeTransportProcesses => {
                Ok(include_reactions_transport_processes(model))
            }
            CurationStep::IncludeReplications => Ok(include_reactions_replications(model)),
        }
    }
}

/// Curator edits run over a structured model, in push order
#[derive(Debug, Clone)]
pub struct CurationPipeline {
    config: CurationConfiguration,
    steps: Vec<CurationStep>,
}

impl CurationPipeline {
    pub fn new(config: CurationConfiguration) -> Self {
        CurationPipeline {
            config,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: CurationStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[CurationStep] {
        &self.steps
    }

    /// Run every step, stopping at the first one leaving the model inconsistent
    pub fn run(&self, model: &Model) -> Result<(Model, Vec<TranslationReport>), PipelineError> {
        let mut current = model.clone();
        let mut reports = Vec::new();
        for step in &self.steps {
            info!("Running curation step: {}", step.name());
            current = step.apply(&current, &self.config, &mut reports)?;
            current.check_integrity().map_err(CurationError::from)?;
        }
        Ok((current, reports))
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage `{stage}` cannot run once the model is {state:?}")]
    StageOrder {
        stage: &'static str,
        state: NormalizationState,
    },
    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("Curation failed: {0}")]
    Curation(#[from] CurationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::test_utils::setup_model;
    use crate::io::sbml::Section;

    fn test_model() -> SbmlModel {
        let path = format!("{}/test_data/small_model.xml", env!("CARGO_MANIFEST_DIR"));
        SbmlModel::read(path).unwrap()
    }

    #[test]
    fn standard_normalization() {
        let rows = vec![TranslationRow::new("glc", "MNXM41")];
        let pipeline = NormalizationPipeline::standard(CurationConfiguration::default(), rows)
            .unwrap();
        assert_eq!(pipeline.stages().len(), 4);
        let model = test_model();
        let (normalized, reports) = pipeline.run(&model).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            normalized.compartment("b").unwrap().attribute("name"),
            Some("model boundary")
        );
        let boundary = normalized.species("MNXM41_b").unwrap();
        assert_eq!(boundary.attribute("compartment"), Some("b"));
        assert!(normalized.species("MNXM41_c").is_some());
        assert!(normalized.species("atp_c").is_some());
        assert_eq!(normalized.len(Section::Species), model.len(Section::Species));
        assert!(normalized.dangling_references().is_empty());
    }

    #[test]
    fn normalization_stops_on_missing_boundary_compartment() {
        let source = r##"<sbml><model><listOfCompartments>
            <compartment id="c"/><compartment id="e"/>
            </listOfCompartments><listOfSpecies>
            <species id="M_glc_e_boundary" compartment="e"/>
            </listOfSpecies><listOfReactions/></model></sbml>"##;
        let document = crate::io::sbml::SbmlDocument::from_str(source).unwrap();
        let model = SbmlModel::new(document).unwrap();
        let pipeline =
            NormalizationPipeline::standard(CurationConfiguration::default(), Vec::new()).unwrap();
        assert!(matches!(
            pipeline.run(&model),
            Err(PipelineError::Normalize(NormalizeError::DanglingReferences(_)))
        ));
    }

    #[test]
    fn stage_order_is_enforced() {
        let mut pipeline = NormalizationPipeline::new(CurationConfiguration::default());
        assert!(matches!(
            pipeline.push(NormalizationStage::TranslateIdentifiers(Vec::new())),
            Err(PipelineError::StageOrder {
                state: NormalizationState::Raw,
                ..
            })
        ));
        pipeline.push(NormalizationStage::StripPrefix).unwrap();
        assert!(matches!(
            pipeline.push(NormalizationStage::RewriteBoundary),
            Err(PipelineError::StageOrder { .. })
        ));
        pipeline
            .push(NormalizationStage::TranslateIdentifiers(Vec::new()))
            .unwrap()
            .push(NormalizationStage::TranslateIdentifiers(Vec::new()))
            .unwrap();
        assert!(matches!(
            pipeline.push(NormalizationStage::StripPrefix),
            Err(PipelineError::StageOrder {
                state: NormalizationState::Translated,
                ..
            })
        ));
        assert_eq!(pipeline.stages().len(), 3);
    }

    #[test]
    fn structural_stages_in_either_order() {
        let mut pipeline = NormalizationPipeline::new(CurationConfiguration::default());
        pipeline
            .push(NormalizationStage::RewriteBoundary)
            .unwrap()
            .push(NormalizationStage::RenameCompartments)
            .unwrap();
        let (normalized, reports) = pipeline.run(&test_model()).unwrap();
        assert!(reports.is_empty());
        assert!(normalized.species("M_glc_b").is_some());
    }

    #[test]
    fn curation_steps_in_order() {
        let model = setup_model();
        let mut pipeline = CurationPipeline::new(CurationConfiguration::default());
        pipeline
            .push(CurationStep::Translate(vec![TranslationRow::new(
                "MNXM41", "MNXM99",
            )]))
            .push(CurationStep::RemoveMetabolites(vec![
                MetaboliteRemovalRow::new("MNXM3", "MNXM2"),
            ]))
            .push(CurationStep::OverrideMetaboliteFields(vec![
                FieldOverrideRow::new("MNXM99", "name", "D-glucose"),
            ]))
            .push(CurationStep::RemoveReactions(vec![ReactionRemovalRow {
                identifier: "H2Ot".to_string(),
            }]));
        let (curated, reports) = pipeline.run(&model).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(curated.metabolites["MNXM99"].name.as_deref(), Some("D-glucose"));
        assert!(!curated.metabolites.contains_key("MNXM3"));
        assert!(!curated.reactions.contains_key("H2Ot"));
        assert!(curated.check_integrity().is_ok());
    }

    #[test]
    fn enhancement_steps() {
        let model = setup_model();
        let mut pipeline = CurationPipeline::new(CurationConfiguration::default());
        pipeline
            .push(CurationStep::ChangeMetabolites(vec![ChangeRow::new(
                "MNXM41", "MNXM41", "glucose", "D-glucose",
            )]))
            .push(CurationStep::ChangeReactions(vec![ChangeRow::new(
                "H2Ot", "H2Ot_old", "water", "water",
            )]))
            .push(CurationStep::IncludeTransportProcesses)
            .push(CurationStep::IncludeReplications);
        let (curated, _) = pipeline.run(&model).unwrap();
        assert_eq!(curated.metabolites["MNXM41"].name.as_deref(), Some("D-glucose"));
        assert_eq!(curated.reactions.len(), 2);
        assert_eq!(curated.reactions["GLCt"].replicates, vec!["GLCt"]);
    }

    #[test]
    fn curation_stops_at_inconsistent_step() {
        let model = setup_model();
        let mut pipeline = CurationPipeline::new(CurationConfiguration::default());
        pipeline
            .push(CurationStep::RemoveMetabolites(vec![
                MetaboliteRemovalRow::new("MNXM7", ""),
            ]))
            .push(CurationStep::EnrichReactionNames(IndexMap::new()));
        assert!(matches!(
            pipeline.run(&model),
            Err(PipelineError::Curation(CurationError::DanglingReferences(_)))
        ));
    }
}
