//! In-memory model of mass-spectrometry identification results.
//!
//! Core concepts:
//! - **Catalog**: The controlled vocabularies, with every known term behind a compact [`CvId`]
//! - **CvTranslator**: Maps a document's local CV aliases to canonical ontology keys
//! - **Document**: Owns every entity in arenas and keeps a registry per top-level kind
//! - **Ref**: A reference to another entity, held as an identifier until resolved
//! - **ValueEq**: Structural equality and hashing that ignore identifiers and entry order
//! - **Rebuild**: Collapses duplicate evidence, peptides, sequences and inputs
//!
//! Readers and writers exchange [`record`] values with the model through
//! [`Document::from_record`] and [`Document::to_record`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mzident_core::{Catalog, Document, Ref};
//! use mzident_core::model::{Peptide, PeptideEvidence};
//!
//! let mut doc = Document::new(Arc::new(Catalog::builtin()));
//!
//! let peptide = doc.add(Peptide {
//!     id: Some("PEP_1".into()),
//!     sequence: "PEPTIDE".into(),
//!     ..Default::default()
//! });
//! let evidence = doc.add(PeptideEvidence {
//!     id: Some("PE_1".into()),
//!     peptide: Ref::by_id("PEP_1"),
//!     ..Default::default()
//! });
//!
//! doc.resolve_references();
//! assert_eq!(doc.get(evidence).unwrap().peptide.get(), Some(peptide));
//! ```

extern crate self as mzident_core;

mod arena;
mod catalog;
mod codec;
mod collection;
mod construct;
mod document;
mod entity;
pub mod model;
mod modification;
mod param;
mod rebuild;
pub mod record;
mod reference;
mod serialize;
pub mod terms;
mod translator;
pub mod value_eq;

pub use arena::{Arena, Arenas, ContextId, Handle};
pub use catalog::{Catalog, CatalogBuilder, CatalogError, CvId, OntologyInfo, TermInfo, TermRecord};
pub use codec::{decode, encode, CodecError, Digest};
pub use collection::Collection;
pub use construct::{ConstructError, FromRecord};
pub use document::{Document, Registries};
pub use entity::{Entity, Kind, Registered};
pub use mzident_derive::ValueEq;
pub use param::{Annotation, CvParam, Term, TermText, UserParam};
pub use rebuild::{NamingScheme, PassReport, RebuildReport};
pub use reference::{Lookup, Ref};
pub use serialize::{RecordWriter, ToRecord};
pub use translator::{CvDeclaration, CvTranslator};
pub use value_eq::ValueEq;
