//! Recomputes the shared registries from the results graph.
//!
//! Each pass walks references in traversal order, collapses structurally
//! equal entities onto the first one seen, renumbers the survivors and
//! replaces the registry. Passes run leaf-ward (evidence before peptides
//! before sequences before databases) so that references rewritten by one
//! pass are already canonical when the next pass compares by content.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::arena::{Arenas, Handle};
use crate::document::Document;
use crate::entity::{Entity, Kind, Registered};
use crate::model::{DbSequence, Peptide, PeptideEvidence, SearchDatabase, SpectraData};
use crate::reference::Ref;
use crate::value_eq::ValueEq;

/// Identifier prefixes assigned to canonical entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingScheme {
    pub evidence: String,
    pub peptide: String,
    pub db_sequence: String,
    pub database: String,
    pub spectra_data: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        NamingScheme {
            evidence: "Pep_".to_string(),
            peptide: "Pep_".to_string(),
            db_sequence: "DBSeq_".to_string(),
            database: "SearchDB_".to_string(),
            spectra_data: "SID_".to_string(),
        }
    }
}

/// Outcome of one dedup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Distinct entities reached by the traversal.
    pub collected: usize,
    /// Entities folded into an earlier equal one.
    pub duplicates: usize,
}

impl PassReport {
    /// Entities left in the registry.
    pub fn kept(&self) -> usize {
        self.collected - self.duplicates
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// References resolved by the sweep that precedes the passes.
    pub resolved: usize,
    pub evidence: PassReport,
    pub peptides: PassReport,
    pub db_sequences: PassReport,
    pub databases: PassReport,
    pub spectra_data: PassReport,
}

/// Canonical set of one kind, built in first-seen order.
struct Dedup<T> {
    canonical: Vec<Handle<T>>,
    buckets: HashMap<u64, Vec<Handle<T>>>,
    replacements: HashMap<Handle<T>, Handle<T>>,
    seen: HashSet<Handle<T>>,
}

impl<T: Kind> Dedup<T> {
    fn new() -> Self {
        Dedup {
            canonical: Vec::new(),
            buckets: HashMap::new(),
            replacements: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns the canonical handle for `handle`.
    fn offer(&mut self, handle: Handle<T>, arenas: &Arenas) -> Handle<T> {
        if let Some(&canonical) = self.replacements.get(&handle) {
            return canonical;
        }
        if !self.seen.insert(handle) {
            return handle;
        }
        let Some(entity) = arenas.get(handle) else {
            return handle;
        };
        let bucket = self.buckets.entry(entity.value_hash(arenas)).or_default();
        let equal = bucket
            .iter()
            .copied()
            .find(|&c| arenas.get(c).is_some_and(|other| entity.value_eq(other, arenas)));
        match equal {
            Some(canonical) => {
                self.replacements.insert(handle, canonical);
                canonical
            }
            None => {
                bucket.push(handle);
                self.canonical.push(handle);
                handle
            }
        }
    }

    /// Offers every resolved reference, returning the ones to rewrite.
    fn offer_refs<'a, O: 'a>(
        &mut self,
        refs: impl IntoIterator<Item = (O, &'a Ref<T>)>,
        arenas: &Arenas,
    ) -> Vec<(O, Handle<T>)>
    where
        T: 'a,
    {
        let mut rewrites = Vec::new();
        for (owner, r) in refs {
            if let Some(handle) = r.get() {
                let canonical = self.offer(handle, arenas);
                if canonical != handle {
                    rewrites.push((owner, canonical));
                }
            }
        }
        rewrites
    }

    fn report(&self) -> PassReport {
        PassReport {
            collected: self.seen.len(),
            duplicates: self.replacements.len(),
        }
    }
}

impl Document {
    /// Rebuilds the shared registries with the default naming scheme.
    pub fn rebuild(&mut self) -> RebuildReport {
        self.rebuild_with(&NamingScheme::default())
    }

    pub fn rebuild_with(&mut self, naming: &NamingScheme) -> RebuildReport {
        let resolved = self.resolve_references();
        let evidence = self.rebuild_evidence(&naming.evidence);
        let peptides = self.rebuild_peptides(&naming.peptide);
        let db_sequences = self.rebuild_db_sequences(&naming.db_sequence);
        let databases = self.rebuild_databases(&naming.database);
        let spectra_data = self.rebuild_spectra_data(&naming.spectra_data);
        RebuildReport {
            resolved,
            evidence,
            peptides,
            db_sequences,
            databases,
            spectra_data,
        }
    }

    fn rebuild_evidence(&mut self, prefix: &str) -> PassReport {
        let items = self.items_in_order();
        let mut dedup = Dedup::<PeptideEvidence>::new();
        let refs = items
            .iter()
            .filter_map(|&h| self.arenas.get(h).map(|item| (h, item)))
            .flat_map(|(h, item)| {
                item.peptide_evidence.iter().enumerate().map(move |(slot, r)| ((h, slot), r))
            });
        let rewrites = dedup.offer_refs(refs, &self.arenas);
        for ((item, slot), canonical) in rewrites {
            self.arenas.id_items[item].peptide_evidence[slot].assign(canonical);
        }
        self.commit(&dedup, prefix)
    }

    fn rebuild_peptides(&mut self, prefix: &str) -> PassReport {
        let items = self.items_in_order();
        let evidence = self.registries.evidence.handles().to_vec();
        let mut dedup = Dedup::<Peptide>::new();

        let item_refs = items.iter().filter_map(|&h| self.arenas.get(h).map(|i| (h, &i.peptide)));
        let item_rewrites = dedup.offer_refs(item_refs, &self.arenas);
        let evidence_refs =
            evidence.iter().filter_map(|&h| self.arenas.get(h).map(|e| (h, &e.peptide)));
        let evidence_rewrites = dedup.offer_refs(evidence_refs, &self.arenas);

        for (item, canonical) in item_rewrites {
            self.arenas.id_items[item].peptide.assign(canonical);
        }
        for (ev, canonical) in evidence_rewrites {
            self.arenas.evidence[ev].peptide.assign(canonical);
        }
        self.commit(&dedup, prefix)
    }

    fn rebuild_db_sequences(&mut self, prefix: &str) -> PassReport {
        let evidence = self.registries.evidence.handles().to_vec();
        let mut dedup = Dedup::<DbSequence>::new();
        let refs = evidence.iter().filter_map(|&h| self.arenas.get(h).map(|e| (h, &e.db_sequence)));
        let rewrites = dedup.offer_refs(refs, &self.arenas);
        for (ev, canonical) in rewrites {
            self.arenas.evidence[ev].db_sequence.assign(canonical);
        }
        self.commit(&dedup, prefix)
    }

    fn rebuild_databases(&mut self, prefix: &str) -> PassReport {
        let sequences = self.registries.db_sequences.handles().to_vec();
        let mut dedup = Dedup::<SearchDatabase>::new();
        let refs =
            sequences.iter().filter_map(|&h| self.arenas.get(h).map(|s| (h, &s.search_database)));
        let rewrites = dedup.offer_refs(refs, &self.arenas);
        for (seq, canonical) in rewrites {
            self.arenas.db_sequences[seq].search_database.assign(canonical);
        }
        self.commit(&dedup, prefix)
    }

    fn rebuild_spectra_data(&mut self, prefix: &str) -> PassReport {
        let results = self.results_in_order();
        let mut dedup = Dedup::<SpectraData>::new();
        let refs = results.iter().filter_map(|&h| self.arenas.get(h).map(|r| (h, &r.spectra_data)));
        let rewrites = dedup.offer_refs(refs, &self.arenas);
        for (result, canonical) in rewrites {
            self.arenas.id_results[result].spectra_data.assign(canonical);
        }
        self.commit(&dedup, prefix)
    }

    /// Renumbers the canonical set and makes it the kind's registry.
    ///
    /// Former members and folded duplicates are detached.
    fn commit<T: Registered>(&mut self, dedup: &Dedup<T>, prefix: &str) -> PassReport {
        for (n, &handle) in dedup.canonical.iter().enumerate() {
            if let Some(entity) = self.arenas.get_mut(handle) {
                entity.set_id(Some(format!("{prefix}{n}")));
            }
        }

        let kept: HashSet<Handle<T>> = dedup.canonical.iter().copied().collect();
        let dropped: Vec<Handle<T>> = T::registry(&self.registries)
            .iter()
            .chain(dedup.replacements.keys().copied())
            .filter(|h| !kept.contains(h))
            .collect();
        for handle in dropped {
            T::attach_tree(handle, None, &mut self.arenas);
        }

        let registry = T::registry_mut(&mut self.registries);
        registry.clear();
        registry.add_range(dedup.canonical.iter().copied(), &mut self.arenas);
        registry.build_index(&self.arenas);

        let report = dedup.report();
        log::debug!(
            "rebuilt {} registry: {} collected, {} duplicates",
            T::KIND,
            report.collected,
            report.duplicates
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::model::{
        SpectrumIdentificationItem, SpectrumIdentificationList, SpectrumIdentificationResult,
    };

    struct Fixture {
        doc: Document,
        result: Handle<SpectrumIdentificationResult>,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new(Arc::new(Catalog::builtin()));
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
        Fixture { doc, result }
    }

    fn item(id: &str, peptide: Handle<Peptide>) -> SpectrumIdentificationItem {
        SpectrumIdentificationItem {
            id: Some(id.into()),
            charge_state: 2,
            rank: 1,
            peptide: Ref::to(peptide),
            ..Default::default()
        }
    }

    fn peptide(id: &str, sequence: &str) -> Peptide {
        Peptide {
            id: Some(id.into()),
            sequence: sequence.into(),
            ..Default::default()
        }
    }

    #[test]
    fn equal_peptides_collapse() {
        let Fixture { mut doc, result } = fixture();
        let a = doc.add(peptide("p1", "PEPTIDE"));
        let b = doc.add(peptide("p2", "PEPTIDE"));
        let c = doc.add(peptide("p3", "ELVIS"));
        let i1 = doc.add_item(result, item("SII_1", a));
        let i2 = doc.add_item(result, item("SII_2", b));
        let i3 = doc.add_item(result, item("SII_3", c));

        let report = doc.rebuild();
        assert_eq!(report.peptides, PassReport { collected: 3, duplicates: 1 });
        assert_eq!(doc.registry::<Peptide>().handles(), &[a, c]);

        let target = |i: Handle<SpectrumIdentificationItem>| doc.get(i).and_then(|it| it.peptide.get());
        assert_eq!(target(i1), Some(a));
        assert_eq!(target(i2), Some(a));
        assert_eq!(target(i3), Some(c));
        assert_eq!(doc.get(a).and_then(|p| p.id.clone()).as_deref(), Some("Pep_0"));
        assert_eq!(doc.get(c).and_then(|p| p.id.clone()).as_deref(), Some("Pep_1"));
        assert_eq!(doc.get(b).and_then(|p| p.context), None);
    }

    #[test]
    fn unreferenced_registry_members_are_dropped() {
        let Fixture { mut doc, result } = fixture();
        let used = doc.add(peptide("p1", "PEPTIDE"));
        let unused = doc.add(peptide("p2", "ELVIS"));
        doc.add_item(result, item("SII_1", used));

        doc.rebuild();
        assert_eq!(doc.registry::<Peptide>().len(), 1);
        assert_eq!(doc.find_peptide("Pep_0"), Some(used));
        assert_eq!(doc.get(unused).and_then(|p| p.context), None);
    }

    #[test]
    fn unresolved_references_are_left_alone() {
        let Fixture { mut doc, result } = fixture();
        let i = doc.add_item(
            result,
            SpectrumIdentificationItem {
                id: Some("SII_1".into()),
                peptide: Ref::by_id("missing"),
                ..Default::default()
            },
        );

        let report = doc.rebuild();
        assert_eq!(report.peptides.collected, 0);
        let id = doc.get(i).and_then(|it| it.peptide.id(doc.arenas())).map(String::from);
        assert_eq!(id.as_deref(), Some("missing"));
    }

    #[test]
    fn naming_scheme_overrides_prefixes() {
        let Fixture { mut doc, result } = fixture();
        let a = doc.add(peptide("p1", "PEPTIDE"));
        doc.add_item(result, item("SII_1", a));

        let naming = NamingScheme {
            peptide: "PEP".into(),
            ..Default::default()
        };
        doc.rebuild_with(&naming);
        assert_eq!(doc.find_peptide("PEP0"), Some(a));
    }

    #[test]
    fn default_naming_scheme() {
        let naming = NamingScheme::default();
        assert_eq!(naming.evidence, "Pep_");
        assert_eq!(naming.peptide, "Pep_");
        assert_eq!(naming.db_sequence, "DBSeq_");
        assert_eq!(naming.database, "SearchDB_");
        assert_eq!(naming.spectra_data, "SID_");
    }
}
