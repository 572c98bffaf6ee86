//! Indexed access to the sections of an SBML model
use std::fmt::{Display, Formatter};
use std::path::Path;

use indexmap::IndexMap;

use crate::io::sbml::element::{Element, Node, SbmlDocument};
use crate::io::sbml::SbmlError;

const PARTICIPANT_LISTS: [&str; 3] = ["listOfReactants", "listOfProducts", "listOfModifiers"];
const SPECIES_REFERENCES: [&str; 2] = ["speciesReference", "modifierSpeciesReference"];

/// The indexed sections of a model, in the order they must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Compartments,
    Species,
    Reactions,
}

impl Section {
    pub fn list_name(self) -> &'static str {
        match self {
            Section::Compartments => "listOfCompartments",
            Section::Species => "listOfSpecies",
            Section::Reactions => "listOfReactions",
        }
    }

    pub fn item_name(self) -> &'static str {
        match self {
            Section::Compartments => "compartment",
            Section::Species => "species",
            Section::Reactions => "reaction",
        }
    }
}

/// Positions of the model and its sections in the tree
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sections {
    model: usize,
    compartments: usize,
    species: usize,
    reactions: usize,
}

impl Sections {
    fn locate(document: &SbmlDocument) -> Result<Sections, SbmlError> {
        let root = &document.root;
        if root.local_name() != "sbml" {
            return Err(SbmlError::MalformedModel(format!(
                "root element is <{}>, expected <sbml>",
                root.name
            )));
        }
        let model = root
            .position_of_child("model")
            .ok_or_else(|| SbmlError::MalformedModel("missing <model>".to_string()))?;
        let model_element = root
            .element_at(model)
            .ok_or_else(|| SbmlError::MalformedModel("missing <model>".to_string()))?;

        let find = |section: Section| {
            model_element
                .position_of_child(section.list_name())
                .ok_or_else(|| {
                    SbmlError::MalformedModel(format!("missing <{}>", section.list_name()))
                })
        };
        let sections = Sections {
            model,
            compartments: find(Section::Compartments)?,
            species: find(Section::Species)?,
            reactions: find(Section::Reactions)?,
        };
        if !(sections.compartments < sections.species && sections.species < sections.reactions) {
            return Err(SbmlError::MalformedModel(
                "sections must appear as compartments, species, reactions".to_string(),
            ));
        }
        Ok(sections)
    }

    fn position(&self, section: Section) -> usize {
        match section {
            Section::Compartments => self.compartments,
            Section::Species => self.species,
            Section::Reactions => self.reactions,
        }
    }
}

/// A reference in the tree to a component which does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDanglingReference {
    /// A species reference of a reaction names an absent species
    SpeciesReference { reaction: String, species: String },
    /// A species is placed in an absent compartment
    Compartment { species: String, compartment: String },
}

impl Display for TreeDanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeDanglingReference::SpeciesReference { reaction, species } => {
                write!(f, "reaction {} references missing species {}", reaction, species)
            }
            TreeDanglingReference::Compartment {
                species,
                compartment,
            } => write!(
                f,
                "species {} is in missing compartment {}",
                species, compartment
            ),
        }
    }
}

/// An SBML document with its compartments, species and reactions indexed by id
///
/// The indices are built once when the model is created. The model is never mutated, stages
/// take an [`SbmlEdit`] copy from [`SbmlModel::edit`] and re-index it when done.
#[derive(Debug, Clone)]
pub struct SbmlModel {
    document: SbmlDocument,
    sections: Sections,
    compartments: IndexMap<String, usize>,
    species: IndexMap<String, usize>,
    reactions: IndexMap<String, usize>,
}

impl SbmlModel {
    /// Locate the sections of `document` and index them
    pub fn new(document: SbmlDocument) -> Result<SbmlModel, SbmlError> {
        let sections = Sections::locate(&document)?;
        let mut model = SbmlModel {
            document,
            sections,
            compartments: IndexMap::new(),
            species: IndexMap::new(),
            reactions: IndexMap::new(),
        };
        model.compartments = model.build_index(Section::Compartments)?;
        model.species = model.build_index(Section::Species)?;
        model.reactions = model.build_index(Section::Reactions)?;
        Ok(model)
    }

    /// Read and index a model from a file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<SbmlModel, SbmlError> {
        SbmlModel::new(SbmlDocument::read(path)?)
    }

    /// Write the model's document to a file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), SbmlError> {
        self.document.write(path)
    }

    fn build_index(&self, section: Section) -> Result<IndexMap<String, usize>, SbmlError> {
        let mut index = IndexMap::new();
        let Some(list) = self.list(section) else {
            return Ok(index);
        };
        for (position, node) in list.children.iter().enumerate() {
            let Node::Element(element) = node else {
                continue;
            };
            if element.local_name() != section.item_name() {
                continue;
            }
            let id = element.id().ok_or_else(|| {
                SbmlError::MalformedModel(format!("<{}> without an id", section.item_name()))
            })?;
            if index.insert(id.to_string(), position).is_some() {
                return Err(SbmlError::DuplicateIdentifier {
                    section: section.list_name(),
                    id: id.to_string(),
                });
            }
        }
        Ok(index)
    }

    fn model_element(&self) -> Option<&Element> {
        self.document.root.element_at(self.sections.model)
    }

    fn list(&self, section: Section) -> Option<&Element> {
        self.model_element()
            .and_then(|model| model.element_at(self.sections.position(section)))
    }

    fn index(&self, section: Section) -> &IndexMap<String, usize> {
        match section {
            Section::Compartments => &self.compartments,
            Section::Species => &self.species,
            Section::Reactions => &self.reactions,
        }
    }

    fn lookup(&self, section: Section, id: &str) -> Option<&Element> {
        let position = *self.index(section).get(id)?;
        self.list(section)?.element_at(position)
    }

    fn iter_section(&self, section: Section) -> impl Iterator<Item = &Element> {
        let list = self.list(section);
        self.index(section)
            .values()
            .filter_map(move |&position| list.and_then(|l| l.element_at(position)))
    }

    pub fn document(&self) -> &SbmlDocument {
        &self.document
    }

    pub fn into_document(self) -> SbmlDocument {
        self.document
    }

    /// Id of the `<model>` element
    pub fn model_id(&self) -> Option<&str> {
        self.model_element().and_then(Element::id)
    }

    pub fn compartment(&self, id: &str) -> Option<&Element> {
        self.lookup(Section::Compartments, id)
    }

    pub fn species(&self, id: &str) -> Option<&Element> {
        self.lookup(Section::Species, id)
    }

    pub fn reaction(&self, id: &str) -> Option<&Element> {
        self.lookup(Section::Reactions, id)
    }

    pub fn compartments(&self) -> impl Iterator<Item = &Element> {
        self.iter_section(Section::Compartments)
    }

    pub fn species_iter(&self) -> impl Iterator<Item = &Element> {
        self.iter_section(Section::Species)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Element> {
        self.iter_section(Section::Reactions)
    }

    /// Number of indexed components in a section
    pub fn len(&self, section: Section) -> usize {
        self.index(section).len()
    }

    pub fn contains(&self, section: Section, id: &str) -> bool {
        self.index(section).contains_key(id)
    }

    /// Ids of the species referenced by a reaction, reactants and products alike
    pub fn species_references(&self, reaction: &Element) -> Vec<String> {
        reaction
            .child_elements()
            .filter(|list| PARTICIPANT_LISTS.contains(&list.local_name()))
            .flat_map(|list| list.child_elements())
            .filter(|e| SPECIES_REFERENCES.contains(&e.local_name()))
            .filter_map(|e| e.attribute("species"))
            .map(str::to_string)
            .collect()
    }

    /// Reaction names keyed by reaction id, an absent name is empty
    pub fn reaction_names(&self) -> IndexMap<String, String> {
        self.reactions()
            .filter_map(|reaction| {
                let id = reaction.id()?;
                let name = reaction.attribute("name").unwrap_or_default();
                Some((id.to_string(), name.to_string()))
            })
            .collect()
    }

    /// Every species reference to an absent species and every species in an absent compartment
    pub fn dangling_references(&self) -> Vec<TreeDanglingReference> {
        let mut dangling = Vec::new();
        for species in self.species_iter() {
            let Some(compartment) = species.attribute("compartment") else {
                continue;
            };
            if !self.compartments.contains_key(compartment) {
                dangling.push(TreeDanglingReference::Compartment {
                    species: species.id().unwrap_or_default().to_string(),
                    compartment: compartment.to_string(),
                });
            }
        }
        for reaction in self.reactions() {
            for species in self.species_references(reaction) {
                if !self.species.contains_key(&species) {
                    dangling.push(TreeDanglingReference::SpeciesReference {
                        reaction: reaction.id().unwrap_or_default().to_string(),
                        species,
                    });
                }
            }
        }
        dangling
    }

    /// Deep copy of the document for a stage to modify
    pub fn edit(&self) -> SbmlEdit {
        SbmlEdit {
            document: self.document.clone(),
            sections: self.sections,
        }
    }
}

/// A mutable copy of an [`SbmlModel`]'s document
///
/// The section positions stay valid while editing since stages only change the items within
/// a section. [`SbmlEdit::finish`] rebuilds the id indices.
#[derive(Debug, Clone)]
pub struct SbmlEdit {
    document: SbmlDocument,
    sections: Sections,
}

impl SbmlEdit {
    fn list_mut(&mut self, section: Section) -> Option<&mut Element> {
        let position = self.sections.position(section);
        self.document
            .root
            .element_at_mut(self.sections.model)
            .and_then(|model| model.element_at_mut(position))
    }

    /// Items of a section in document order
    pub fn items_mut(&mut self, section: Section) -> Vec<&mut Element> {
        match self.list_mut(section) {
            Some(list) => list
                .child_elements_mut()
                .filter(|e| e.local_name() == section.item_name())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every species reference of every reaction
    pub fn species_references_mut(&mut self) -> Vec<&mut Element> {
        let mut references = Vec::new();
        for reaction in self.items_mut(Section::Reactions) {
            for list in reaction.child_elements_mut() {
                if !PARTICIPANT_LISTS.contains(&list.local_name()) {
                    continue;
                }
                references.extend(
                    list.child_elements_mut()
                        .filter(|e| SPECIES_REFERENCES.contains(&e.local_name())),
                );
            }
        }
        references
    }

    /// Keep only the items of a section for which `keep` returns true
    pub fn retain_items<F: FnMut(&Element) -> bool>(&mut self, section: Section, mut keep: F) {
        if let Some(list) = self.list_mut(section) {
            list.children.retain(|node| match node {
                Node::Element(e) if e.local_name() == section.item_name() => {
                    keep(e)
                }
                _ => true,
            });
        }
    }

    /// Re-index the edited document
    pub fn finish(self) -> Result<SbmlModel, SbmlError> {
        SbmlModel::new(self.document)
    }
}
