use crate::arena::ContextId;
use crate::entity::{arena_access, impl_entity, impl_registered, Kind};
use crate::param::{Annotation, CvParam};
use crate::ValueEq;

/// A sequence database the search ran against.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SearchDatabase {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: String,
    pub version: Option<String>,
    pub release_date: Option<String>,
    pub num_database_sequences: Option<u64>,
    pub num_residues: Option<u64>,
    pub file_format: Option<CvParam>,
    pub database_name: Option<Annotation>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SearchDatabase, "SearchDatabase");

impl Kind for SearchDatabase {
    arena_access!(databases);
}

impl_registered!(SearchDatabase, databases);

/// A source of spectra, typically one peak-list file.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SpectraData {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: String,
    pub file_format: Option<CvParam>,
    pub spectrum_id_format: CvParam,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SpectraData, "SpectraData");

impl Kind for SpectraData {
    arena_access!(spectra_data);
}

impl_registered!(SpectraData, spectra_data);
