//! Entity kinds of an identification-results document.
//!
//! Top-level kinds live in the document registries; spectrum identification
//! results and items are owned by their list and result respectively.

mod audit;
mod inputs;
mod protocol;
mod results;
mod sequence;

pub use audit::{AnalysisSoftware, Contact, ContactRole, Organization, Person, Sample};
pub use inputs::{SearchDatabase, SpectraData};
pub use protocol::{Enzyme, SearchModification, SpectrumIdentificationProtocol};
pub use results::{
    SpectrumIdentificationItem, SpectrumIdentificationList, SpectrumIdentificationResult,
};
pub use sequence::{DbSequence, Modification, Peptide, PeptideEvidence, SubstitutionModification};
