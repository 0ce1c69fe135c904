use crate::arena::ContextId;
use crate::document::Document;
use crate::entity::{arena_access, impl_entity, impl_registered, Kind};
use crate::model::SearchDatabase;
use crate::param::{Annotation, CvParam};
use crate::reference::Ref;
use crate::ValueEq;

/// A protein (or other) sequence from a search database.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct DbSequence {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub accession: String,
    pub length: Option<u32>,
    pub sequence: Option<String>,
    pub search_database: Ref<SearchDatabase>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(DbSequence, "DBSequence");

impl Kind for DbSequence {
    arena_access!(db_sequences);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        usize::from(self.search_database.resolve(doc))
    }
}

impl_registered!(DbSequence, db_sequences);

/// A mass modification at one position of a peptide.
#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct Modification {
    /// 0 is the N-terminus, length + 1 the C-terminus.
    pub location: Option<i32>,
    pub residues: Vec<String>,
    pub avg_mass_delta: Option<f64>,
    pub monoisotopic_mass_delta: Option<f64>,
    pub cv_params: Vec<CvParam>,
}

#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct SubstitutionModification {
    pub original_residue: String,
    pub replacement_residue: String,
    pub location: Option<i32>,
    pub avg_mass_delta: Option<f64>,
    pub monoisotopic_mass_delta: Option<f64>,
}

#[derive(Debug, Clone, Default, ValueEq)]
pub struct Peptide {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub sequence: String,
    pub modifications: Vec<Modification>,
    pub substitutions: Vec<SubstitutionModification>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(Peptide, "Peptide");

impl Kind for Peptide {
    arena_access!(peptides);
}

impl_registered!(Peptide, peptides);

/// Where a peptide occurs in a database sequence.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct PeptideEvidence {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub peptide: Ref<Peptide>,
    pub db_sequence: Ref<DbSequence>,
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub pre: Option<String>,
    pub post: Option<String>,
    pub frame: Option<i32>,
    pub is_decoy: bool,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(PeptideEvidence, "PeptideEvidence");

impl Kind for PeptideEvidence {
    arena_access!(evidence);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        usize::from(self.peptide.resolve(doc)) + usize::from(self.db_sequence.resolve(doc))
    }
}

impl_registered!(PeptideEvidence, evidence);
