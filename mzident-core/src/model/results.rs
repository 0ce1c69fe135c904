use std::mem;

use crate::arena::{Arenas, ContextId, Handle};
use crate::collection::Collection;
use crate::document::Document;
use crate::entity::{arena_access, impl_entity, impl_registered, Entity, Kind};
use crate::model::{Peptide, PeptideEvidence, SpectraData};
use crate::param::Annotation;
use crate::reference::Ref;
use crate::ValueEq;

/// One peptide-spectrum match.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SpectrumIdentificationItem {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub charge_state: i32,
    pub experimental_mass_to_charge: f64,
    pub calculated_mass_to_charge: Option<f64>,
    pub calculated_pi: Option<f64>,
    pub rank: u32,
    pub pass_threshold: bool,
    pub peptide: Ref<Peptide>,
    pub peptide_evidence: Vec<Ref<PeptideEvidence>>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SpectrumIdentificationItem, "SpectrumIdentificationItem");

impl Kind for SpectrumIdentificationItem {
    arena_access!(id_items);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        let evidence: usize = self
            .peptide_evidence
            .iter_mut()
            .map(|r| usize::from(r.resolve(doc)))
            .sum();
        evidence + usize::from(self.peptide.resolve(doc))
    }
}

/// All matches reported for one spectrum.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SpectrumIdentificationResult {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub spectrum_id: String,
    pub spectra_data: Ref<SpectraData>,
    pub items: Collection<SpectrumIdentificationItem>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SpectrumIdentificationResult, "SpectrumIdentificationResult");

impl Kind for SpectrumIdentificationResult {
    arena_access!(id_results);

    fn attach_tree(handle: Handle<Self>, context: Option<ContextId>, arenas: &mut Arenas) {
        let Some(result) = arenas.id_results.get_mut(handle) else {
            return;
        };
        result.attach(context);
        let mut items = mem::take(&mut result.items);
        items.set_context(context, arenas);
        arenas.id_results[handle].items = items;
    }

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        usize::from(self.spectra_data.resolve(doc))
    }
}

/// The results of one search, grouped by spectrum.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct SpectrumIdentificationList {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub num_sequences_searched: Option<u64>,
    pub results: Collection<SpectrumIdentificationResult>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(SpectrumIdentificationList, "SpectrumIdentificationList");

impl Kind for SpectrumIdentificationList {
    arena_access!(id_lists);

    fn attach_tree(handle: Handle<Self>, context: Option<ContextId>, arenas: &mut Arenas) {
        let Some(list) = arenas.id_lists.get_mut(handle) else {
            return;
        };
        list.attach(context);
        let mut results = mem::take(&mut list.results);
        results.set_context(context, arenas);
        arenas.id_lists[handle].results = results;
    }
}

impl_registered!(SpectrumIdentificationList, id_lists);
