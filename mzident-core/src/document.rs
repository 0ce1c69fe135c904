use std::mem;
use std::sync::Arc;

use crate::arena::{Arenas, ContextId, Handle};
use crate::catalog::Catalog;
use crate::collection::Collection;
use crate::entity::{Entity, Kind, Registered};
use crate::model::{
    AnalysisSoftware, Contact, DbSequence, Peptide, PeptideEvidence, Sample, SearchDatabase,
    SpectraData, SpectrumIdentificationItem, SpectrumIdentificationList,
    SpectrumIdentificationProtocol, SpectrumIdentificationResult,
};
use crate::reference::{Lookup, Ref};
use crate::translator::CvTranslator;

/// Top-level registries of a document, one per shared kind.
#[derive(Debug, Default)]
pub struct Registries {
    pub(crate) contacts: Collection<Contact>,
    pub(crate) software: Collection<AnalysisSoftware>,
    pub(crate) samples: Collection<Sample>,
    pub(crate) databases: Collection<SearchDatabase>,
    pub(crate) spectra_data: Collection<SpectraData>,
    pub(crate) db_sequences: Collection<DbSequence>,
    pub(crate) peptides: Collection<Peptide>,
    pub(crate) evidence: Collection<PeptideEvidence>,
    pub(crate) protocols: Collection<SpectrumIdentificationProtocol>,
    pub(crate) id_lists: Collection<SpectrumIdentificationList>,
}

impl Registries {
    fn new(context: ContextId) -> Self {
        let context = Some(context);
        Registries {
            contacts: Collection::indexed(context),
            software: Collection::indexed(context),
            samples: Collection::indexed(context),
            databases: Collection::indexed(context),
            spectra_data: Collection::indexed(context),
            db_sequences: Collection::indexed(context),
            peptides: Collection::indexed(context),
            evidence: Collection::indexed(context),
            protocols: Collection::indexed(context),
            id_lists: Collection::indexed(context),
        }
    }
}

/// The root of one identification-results document.
///
/// Owns every entity object (in per-kind arenas), the top-level registries,
/// the CV translator and a shared handle on the term catalog. Entities
/// reachable from the document carry its [`ContextId`].
#[derive(Debug)]
pub struct Document {
    context: ContextId,
    catalog: Arc<Catalog>,
    translator: CvTranslator,
    pub(crate) arenas: Arenas,
    pub(crate) registries: Registries,
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub creation_date: Option<String>,
}

impl Document {
    /// Creates an empty document declaring every catalog ontology.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let translator = CvTranslator::new(&catalog);
        Self::with_translator(catalog, translator)
    }

    pub fn with_translator(catalog: Arc<Catalog>, translator: CvTranslator) -> Self {
        let context = ContextId::fresh();
        Document {
            context,
            catalog,
            translator,
            arenas: Arenas::default(),
            registries: Registries::new(context),
            id: None,
            name: None,
            version: None,
            creation_date: None,
        }
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn translator(&self) -> &CvTranslator {
        &self.translator
    }

    pub fn arenas(&self) -> &Arenas {
        &self.arenas
    }

    /// Stores an entity (and its owned subtree) in this document.
    pub fn adopt<T: Kind>(&mut self, entity: T) -> Handle<T> {
        let handle = T::arena_mut(&mut self.arenas).alloc(entity);
        T::attach_tree(handle, Some(self.context), &mut self.arenas);
        handle
    }

    /// Adopts an entity and appends it to its kind's registry.
    pub fn add<T: Registered>(&mut self, entity: T) -> Handle<T> {
        let handle = self.adopt(entity);
        self.register(handle);
        handle
    }

    /// Appends an adopted entity to its kind's registry.
    pub fn register<T: Registered>(&mut self, handle: Handle<T>) {
        T::registry_mut(&mut self.registries).add(handle, &mut self.arenas);
    }

    pub fn registry<T: Registered>(&self) -> &Collection<T> {
        T::registry(&self.registries)
    }

    pub fn get<T: Kind>(&self, handle: Handle<T>) -> Option<&T> {
        self.arenas.get(handle)
    }

    pub fn get_mut<T: Kind>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.arenas.get_mut(handle)
    }

    /// Registry members of one kind, in order.
    pub fn entities<T: Registered>(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        T::registry(&self.registries)
            .iter()
            .filter_map(|h| self.arenas.get(h).map(|e| (h, e)))
    }

    /// Looks up a registered entity by identifier.
    pub fn find<T: Registered>(&self, id: &str) -> Option<Handle<T>> {
        T::registry(&self.registries).find_by_id(id, &self.arenas)
    }

    pub fn find_contact(&self, id: &str) -> Option<Handle<Contact>> {
        self.find(id)
    }

    pub fn find_software(&self, id: &str) -> Option<Handle<AnalysisSoftware>> {
        self.find(id)
    }

    pub fn find_sample(&self, id: &str) -> Option<Handle<Sample>> {
        self.find(id)
    }

    pub fn find_search_database(&self, id: &str) -> Option<Handle<SearchDatabase>> {
        self.find(id)
    }

    pub fn find_spectra_data(&self, id: &str) -> Option<Handle<SpectraData>> {
        self.find(id)
    }

    pub fn find_db_sequence(&self, id: &str) -> Option<Handle<DbSequence>> {
        self.find(id)
    }

    pub fn find_peptide(&self, id: &str) -> Option<Handle<Peptide>> {
        self.find(id)
    }

    pub fn find_peptide_evidence(&self, id: &str) -> Option<Handle<PeptideEvidence>> {
        self.find(id)
    }

    pub fn find_protocol(&self, id: &str) -> Option<Handle<SpectrumIdentificationProtocol>> {
        self.find(id)
    }

    pub fn find_id_list(&self, id: &str) -> Option<Handle<SpectrumIdentificationList>> {
        self.find(id)
    }

    /// Adopts a result and appends it to a list.
    ///
    /// # Panics
    ///
    /// Panics if `list` was issued by another document.
    pub fn add_result(
        &mut self,
        list: Handle<SpectrumIdentificationList>,
        result: SpectrumIdentificationResult,
    ) -> Handle<SpectrumIdentificationResult> {
        let handle = self.arenas.id_results.alloc(result);
        let mut results = mem::take(&mut self.arenas.id_lists[list].results);
        results.add(handle, &mut self.arenas);
        self.arenas.id_lists[list].results = results;
        handle
    }

    /// Adopts an item and appends it to a result.
    ///
    /// # Panics
    ///
    /// Panics if `result` was issued by another document.
    pub fn add_item(
        &mut self,
        result: Handle<SpectrumIdentificationResult>,
        item: SpectrumIdentificationItem,
    ) -> Handle<SpectrumIdentificationItem> {
        let handle = self.arenas.id_items.alloc(item);
        let mut items = mem::take(&mut self.arenas.id_results[result].items);
        items.add(handle, &mut self.arenas);
        self.arenas.id_results[result].items = items;
        handle
    }

    /// Sets a reference field of `owner` by identifier.
    ///
    /// Resolves immediately when the owner is attached to this document and
    /// the target is registered. Returns whether the field ended up resolved.
    pub fn assign_ref<O, T, F>(&mut self, owner: Handle<O>, field: F, id: &str) -> bool
    where
        O: Kind,
        T: Registered,
        F: FnOnce(&mut O) -> &mut Ref<T>,
    {
        let attached = self
            .arenas
            .get(owner)
            .is_some_and(|entity| entity.context() == Some(self.context));
        let target = if attached { self.find::<T>(id) } else { None };
        let Some(entity) = self.arenas.get_mut(owner) else {
            return false;
        };
        let slot = field(entity);
        match target {
            Some(handle) => slot.assign(handle),
            None => *slot = Ref::by_id(id),
        }
        target.is_some()
    }

    /// Points a reference field of `owner` directly at `target`.
    ///
    /// The target (and whatever it owns) is attached to the owner's context,
    /// so an entity detached by a rebuild becomes reachable again.
    pub fn link_ref<O, T, F>(&mut self, owner: Handle<O>, field: F, target: Handle<T>)
    where
        O: Kind,
        T: Kind,
        F: FnOnce(&mut O) -> &mut Ref<T>,
    {
        let Some(context) = self.arenas.get(owner).map(Entity::context) else {
            return;
        };
        T::attach_tree(target, context, &mut self.arenas);
        if let Some(entity) = self.arenas.get_mut(owner) {
            field(entity).assign(target);
        }
    }

    /// Renames a registered entity and re-keys its registry index.
    pub fn set_id<T: Registered>(&mut self, handle: Handle<T>, id: Option<String>) {
        let Some(entity) = self.arenas.get_mut(handle) else {
            return;
        };
        entity.set_id(id);
        let registry = T::registry_mut(&mut self.registries);
        if registry.is_indexed() && registry.contains(handle) {
            registry.build_index(&self.arenas);
        }
    }

    /// Re-attempts every identifier-only reference of every attached entity.
    ///
    /// Returns how many references became resolved.
    pub fn resolve_references(&mut self) -> usize {
        let resolved = self.resolve_kind::<AnalysisSoftware>()
            + self.resolve_kind::<Sample>()
            + self.resolve_kind::<DbSequence>()
            + self.resolve_kind::<PeptideEvidence>()
            + self.resolve_kind::<SpectrumIdentificationProtocol>()
            + self.resolve_kind::<SpectrumIdentificationResult>()
            + self.resolve_kind::<SpectrumIdentificationItem>();
        log::debug!("resolved {resolved} pending references");
        resolved
    }

    // No kind references its own kind, so the arena being walked is never
    // one a lookup reads.
    fn resolve_kind<T: Kind>(&mut self) -> usize {
        let mut arena = mem::take(T::arena_mut(&mut self.arenas));
        let context = Some(self.context);
        let mut resolved = 0;
        for (_, entity) in arena.iter_mut() {
            if entity.context() == context {
                resolved += entity.resolve_refs(self);
            }
        }
        *T::arena_mut(&mut self.arenas) = arena;
        resolved
    }

    /// Activates (or rebuilds) every registry index.
    ///
    /// Returns the total number of shadowed identifiers.
    pub fn build_indexes(&mut self) -> usize {
        let arenas = &self.arenas;
        let r = &mut self.registries;
        r.contacts.build_index(arenas)
            + r.software.build_index(arenas)
            + r.samples.build_index(arenas)
            + r.databases.build_index(arenas)
            + r.spectra_data.build_index(arenas)
            + r.db_sequences.build_index(arenas)
            + r.peptides.build_index(arenas)
            + r.evidence.build_index(arenas)
            + r.protocols.build_index(arenas)
            + r.id_lists.build_index(arenas)
    }

    pub fn drop_indexes(&mut self) {
        let r = &mut self.registries;
        r.contacts.drop_index();
        r.software.drop_index();
        r.samples.drop_index();
        r.databases.drop_index();
        r.spectra_data.drop_index();
        r.db_sequences.drop_index();
        r.peptides.drop_index();
        r.evidence.drop_index();
        r.protocols.drop_index();
        r.id_lists.drop_index();
    }

    /// Results of every list, in list then result order.
    pub(crate) fn results_in_order(&self) -> Vec<Handle<SpectrumIdentificationResult>> {
        self.registries
            .id_lists
            .entities(&self.arenas)
            .flat_map(|list| list.results.iter())
            .collect()
    }

    /// Items of every result, in traversal order.
    pub(crate) fn items_in_order(&self) -> Vec<Handle<SpectrumIdentificationItem>> {
        self.results_in_order()
            .into_iter()
            .filter_map(|h| self.arenas.get(h))
            .flat_map(|result| result.items.iter())
            .collect()
    }
}

impl<T: Registered> Lookup<T> for Document {
    fn find(&self, id: &str) -> Option<Handle<T>> {
        Document::find(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CvId;
    use crate::param::CvParam;

    fn document() -> Document {
        Document::new(Arc::new(Catalog::builtin()))
    }

    fn database(location: &str) -> SearchDatabase {
        SearchDatabase {
            id: Some("DB1".into()),
            location: location.into(),
            ..Default::default()
        }
    }

    fn sequence(id: &str, accession: &str) -> DbSequence {
        DbSequence {
            id: Some(id.into()),
            accession: accession.into(),
            ..Default::default()
        }
    }

    #[test]
    fn add_attaches_and_registers() {
        let mut doc = document();
        let db = doc.add(database("uniprot.fasta"));
        assert_eq!(doc.get(db).and_then(|d| d.context), Some(doc.context()));
        assert_eq!(doc.find_search_database("DB1"), Some(db));
        assert_eq!(doc.registry::<SearchDatabase>().len(), 1);
    }

    #[test]
    fn adopt_does_not_register() {
        let mut doc = document();
        let db = doc.adopt(database("uniprot.fasta"));
        assert_eq!(doc.get(db).and_then(|d| d.context), Some(doc.context()));
        assert_eq!(doc.find_search_database("DB1"), None);
        doc.register(db);
        assert_eq!(doc.find_search_database("DB1"), Some(db));
    }

    #[test]
    fn assign_ref_resolves_registered_target() {
        let mut doc = document();
        let db = doc.add(database("uniprot.fasta"));
        let seq = doc.add(sequence("DBSeq_1", "PROT1"));

        assert!(doc.assign_ref(seq, |s: &mut DbSequence| &mut s.search_database, "DB1"));
        assert_eq!(doc.get(seq).and_then(|s| s.search_database.get()), Some(db));
    }

    #[test]
    fn assign_ref_keeps_id_when_missing() {
        let mut doc = document();
        let seq = doc.add(sequence("DBSeq_1", "PROT1"));
        assert!(!doc.assign_ref(seq, |s: &mut DbSequence| &mut s.search_database, "DB9"));
        let id = doc
            .get(seq)
            .and_then(|s| s.search_database.id(doc.arenas()))
            .map(String::from);
        assert_eq!(id.as_deref(), Some("DB9"));
    }

    #[test]
    fn forward_reference_resolves_later() {
        let mut doc = document();
        let seq = doc.add(sequence("DBSeq_1", "PROT1"));
        doc.assign_ref(seq, |s: &mut DbSequence| &mut s.search_database, "DB1");
        let db = doc.add(database("uniprot.fasta"));

        assert_eq!(doc.resolve_references(), 1);
        assert_eq!(doc.get(seq).and_then(|s| s.search_database.get()), Some(db));
        assert_eq!(doc.resolve_references(), 0);
    }

    #[test]
    fn link_ref_reads_target_id() {
        let mut doc = document();
        let db = doc.add(database("uniprot.fasta"));
        let seq = doc.add(sequence("DBSeq_1", "PROT1"));
        doc.link_ref(seq, |s: &mut DbSequence| &mut s.search_database, db);

        if let Some(d) = doc.get_mut(db) {
            d.id = Some("SearchDB_0".into());
        }
        let id = doc
            .get(seq)
            .and_then(|s| s.search_database.id(doc.arenas()))
            .map(String::from);
        assert_eq!(id.as_deref(), Some("SearchDB_0"));
    }

    #[test]
    fn nested_results_cascade_context() {
        let mut doc = document();
        let list = doc.add(SpectrumIdentificationList {
            id: Some("SIL_1".into()),
            ..Default::default()
        });
        let result = doc.add_result(
            list,
            SpectrumIdentificationResult {
                id: Some("SIR_1".into()),
                spectrum_id: "index=0".into(),
                ..Default::default()
            },
        );
        let item = doc.add_item(
            result,
            SpectrumIdentificationItem {
                id: Some("SII_1".into()),
                charge_state: 2,
                rank: 1,
                ..Default::default()
            },
        );

        let ctx = Some(doc.context());
        assert_eq!(doc.get(result).and_then(|r| r.context), ctx);
        assert_eq!(doc.get(item).and_then(|i| i.context), ctx);
        assert_eq!(doc.items_in_order(), vec![item]);
    }

    #[test]
    fn duplicate_ids_are_counted() {
        let mut doc = document();
        let first = doc.add(sequence("DBSeq_1", "PROT1"));
        doc.add(sequence("DBSeq_1", "PROT2"));
        doc.drop_indexes();
        assert_eq!(doc.build_indexes(), 1);
        assert_eq!(doc.find_db_sequence("DBSeq_1"), Some(first));
    }

    #[test]
    fn two_documents_share_catalog() {
        let catalog = Arc::new(Catalog::builtin());
        let a = Document::new(catalog.clone());
        let b = Document::new(catalog.clone());
        assert_ne!(a.context(), b.context());
        assert_eq!(Arc::strong_count(&catalog), 3);
        let param = CvParam::new(CvId::MS_MASCOT);
        assert_eq!(a.catalog().metadata(param.id()).name, "Mascot");
    }

    fn peptide(id: &str) -> Peptide {
        Peptide {
            id: Some(id.into()),
            sequence: "PEPTIDE".into(),
            ..Default::default()
        }
    }

    #[test]
    fn link_ref_reattaches_detached_target() {
        let mut doc = document();
        let pep = doc.adopt(peptide("p1"));
        Peptide::attach_tree(pep, None, &mut doc.arenas);
        let ev = doc.add(PeptideEvidence {
            id: Some("PE_1".into()),
            ..Default::default()
        });

        doc.link_ref(ev, |e: &mut PeptideEvidence| &mut e.peptide, pep);
        assert_eq!(doc.get(ev).and_then(|e| e.peptide.get()), Some(pep));
        assert_eq!(doc.get(pep).and_then(|p| p.context), Some(doc.context()));
    }

    #[test]
    fn renamed_members_are_found_by_new_id() {
        let mut doc = document();
        let pep = doc.add(peptide("p1"));
        doc.set_id(pep, Some("renamed".into()));
        assert_eq!(doc.find_peptide("renamed"), Some(pep));
        assert_eq!(doc.find_peptide("p1"), None);

        let ev = doc.add(PeptideEvidence {
            id: Some("PE_1".into()),
            ..Default::default()
        });
        assert!(!doc.assign_ref(ev, |e: &mut PeptideEvidence| &mut e.peptide, "p1"));

        if let Some(p) = doc.get_mut(pep) {
            p.id = Some("again".into());
        }
        assert_eq!(doc.find_peptide("again"), Some(pep));
        assert_eq!(doc.find_peptide("renamed"), None);
    }

    #[test]
    fn rehoming_a_list_moves_results_and_items() {
        let mut doc = document();
        let list = doc.add(SpectrumIdentificationList {
            id: Some("SIL_1".into()),
            ..Default::default()
        });
        let result = doc.add_result(
            list,
            SpectrumIdentificationResult {
                id: Some("SIR_1".into()),
                spectrum_id: "index=0".into(),
                ..Default::default()
            },
        );
        let item = doc.add_item(
            result,
            SpectrumIdentificationItem {
                id: Some("SII_1".into()),
                charge_state: 2,
                rank: 1,
                ..Default::default()
            },
        );

        let other = Some(ContextId::fresh());
        let mut lists = mem::take(&mut doc.registries.id_lists);
        lists.set_context(other, &mut doc.arenas);
        doc.registries.id_lists = lists;
        assert_eq!(doc.get(list).and_then(|l| l.context), other);
        assert_eq!(doc.get(result).and_then(|r| r.context), other);
        assert_eq!(doc.get(item).and_then(|i| i.context), other);
        assert_eq!(doc.get(list).and_then(|l| l.results.context()), other);

        SpectrumIdentificationList::attach_tree(list, None, &mut doc.arenas);
        assert_eq!(doc.get(result).and_then(|r| r.context), None);
        assert_eq!(doc.get(item).and_then(|i| i.context), None);
    }
}
