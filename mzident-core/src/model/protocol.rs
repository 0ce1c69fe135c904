use crate::arena::ContextId;
use crate::document::Document;
use crate::entity::{arena_access, impl_entity, impl_registered, Kind};
use crate::model::AnalysisSoftware;
use crate::param::{Annotation, CvParam};
use crate::reference::Ref;
use crate::ValueEq;

/// A modification the search was configured to look for.
#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct SearchModification {
    pub fixed: bool,
    pub mass_delta: f64,
    pub residues: Vec<String>,
    pub cv_params: Vec<CvParam>,
    pub specificity_rules: Vec<CvParam>,
}

#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct Enzyme {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub semi_specific: Option<bool>,
    pub missed_cleavages: Option<u32>,
    pub min_distance: Option<u32>,
    pub site_regexp: Option<String>,
    pub enzyme_name: Vec<Annotation>,
}

/// Parameters of one spectrum identification search.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SpectrumIdentificationProtocol {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub analysis_software: Ref<AnalysisSoftware>,
    pub search_type: Option<Annotation>,
    pub additional_search_params: Vec<Annotation>,
    pub modification_params: Vec<SearchModification>,
    pub enzymes: Vec<Enzyme>,
    pub independent_enzymes: Option<bool>,
    pub parent_tolerance: Vec<CvParam>,
    pub fragment_tolerance: Vec<CvParam>,
    pub threshold: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SpectrumIdentificationProtocol, "SpectrumIdentificationProtocol");

impl Kind for SpectrumIdentificationProtocol {
    arena_access!(protocols);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        usize::from(self.analysis_software.resolve(doc))
    }
}

impl_registered!(SpectrumIdentificationProtocol, protocols);
