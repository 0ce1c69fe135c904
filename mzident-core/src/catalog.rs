use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::terms::{BUILTIN_ONTOLOGIES, BUILTIN_TERMS};

/// Compact code for one ontology term.
///
/// Every code maps to exactly one (ontology, accession) pair of the catalog
/// that issued it. `CvId::UNKNOWN` stands for a term the catalog cannot
/// represent and is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CvId(u32);

impl CvId {
    /// The reserved "could not be classified" term.
    pub const UNKNOWN: CvId = CvId(0);

    pub(crate) const fn from_code(code: u32) -> Self {
        CvId(code)
    }

    /// Returns the numeric code.
    pub fn code(self) -> u32 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl Default for CvId {
    fn default() -> Self {
        CvId::UNKNOWN
    }
}

/// Immutable metadata of one catalog term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermInfo {
    pub accession: String,
    pub name: String,
    /// Canonical key of the owning ontology.
    pub ontology: String,
    pub is_unit: bool,
}

/// Metadata of one source ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyInfo {
    pub key: String,
    pub full_name: String,
    pub uri: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Other declaration ids documents commonly use for this ontology.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl OntologyInfo {
    pub fn new(key: impl Into<String>, full_name: impl Into<String>, uri: impl Into<String>) -> Self {
        OntologyInfo {
            key: key.into(),
            full_name: full_name.into(),
            uri: uri.into(),
            version: None,
            aliases: Vec::new(),
        }
    }
}

/// One term as delivered by an ontology dump parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    #[serde(alias = "id")]
    pub accession: String,
    pub name: String,
    pub ontology: String,
    #[serde(default)]
    pub is_unit: bool,
}

/// Error type for catalog import.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("term record has an empty accession")]
    MissingAccession,
    #[error("duplicate term {accession} in ontology {ontology}")]
    DuplicateTerm { ontology: String, accession: String },
}

/// The closed catalog of ontology terms.
///
/// Built once through [`CatalogBuilder`] and read-only afterwards; share it
/// between documents with an `Arc`.
#[derive(Debug)]
pub struct Catalog {
    terms: Vec<TermInfo>,
    accessions: HashMap<String, HashMap<String, CvId>>,
    any_accession: HashMap<String, CvId>,
    names: HashMap<String, HashMap<String, CvId>>,
    ontologies: IndexMap<String, OntologyInfo>,
}

impl Catalog {
    /// Builds the compiled-in catalog (PSI-MS, UNIMOD and UO subsets).
    pub fn builtin() -> Self {
        CatalogBuilder::builtin().build()
    }

    /// Looks up a term by ontology key and accession.
    pub fn resolve(&self, ontology: &str, accession: &str) -> CvId {
        self.accessions
            .get(ontology)
            .and_then(|terms| terms.get(accession))
            .copied()
            .unwrap_or(CvId::UNKNOWN)
    }

    /// Looks up a term by accession alone, in whichever ontology owns it.
    pub fn resolve_accession(&self, accession: &str) -> CvId {
        self.any_accession
            .get(accession)
            .copied()
            .unwrap_or(CvId::UNKNOWN)
    }

    /// Case-insensitive lookup by display name within one ontology.
    pub fn resolve_by_name(&self, ontology: &str, name: &str) -> CvId {
        self.names
            .get(ontology)
            .and_then(|names| names.get(&name.to_lowercase()))
            .copied()
            .unwrap_or(CvId::UNKNOWN)
    }

    /// Returns the metadata of a term. Unknown and foreign codes get the
    /// empty placeholder.
    pub fn metadata(&self, id: CvId) -> &TermInfo {
        self.terms.get(id.0 as usize).unwrap_or(&self.terms[0])
    }

    pub fn is_unit(&self, id: CvId) -> bool {
        self.metadata(id).is_unit
    }

    pub fn ontology(&self, key: &str) -> Option<&OntologyInfo> {
        self.ontologies.get(key)
    }

    /// Ontologies in registration order.
    pub fn ontologies(&self) -> impl Iterator<Item = &OntologyInfo> {
        self.ontologies.values()
    }

    /// Iterates every known term, excluding the unknown placeholder.
    pub fn iter(&self) -> impl Iterator<Item = (CvId, &TermInfo)> {
        self.terms
            .iter()
            .enumerate()
            .skip(1)
            .map(|(code, info)| (CvId(code as u32), info))
    }

    /// Number of known terms, excluding the unknown placeholder.
    pub fn len(&self) -> usize {
        self.terms.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assembles a [`Catalog`] from the compiled-in table and imported dumps.
///
/// Imported terms are numbered after everything already present, in the
/// order they are pushed.
pub struct CatalogBuilder {
    terms: Vec<TermInfo>,
    accessions: HashMap<String, HashMap<String, CvId>>,
    ontologies: IndexMap<String, OntologyInfo>,
}

impl CatalogBuilder {
    /// Creates a builder holding only the unknown placeholder.
    pub fn new() -> Self {
        CatalogBuilder {
            terms: vec![TermInfo::default()],
            accessions: HashMap::new(),
            ontologies: IndexMap::new(),
        }
    }

    /// Creates a builder preloaded with the compiled-in ontologies and terms.
    pub fn builtin() -> Self {
        let mut builder = Self::new();
        for ontology in BUILTIN_ONTOLOGIES {
            builder.ontology(OntologyInfo {
                key: ontology.key.to_string(),
                full_name: ontology.full_name.to_string(),
                uri: ontology.uri.to_string(),
                version: None,
                aliases: ontology.aliases.iter().map(|a| a.to_string()).collect(),
            });
        }
        for term in BUILTIN_TERMS {
            let id = builder.push(TermInfo {
                accession: term.accession.to_string(),
                name: term.name.to_string(),
                ontology: term.ontology.to_string(),
                is_unit: term.is_unit,
            });
            debug_assert_eq!(id.code(), term.code);
        }
        builder
    }

    /// Registers or replaces an ontology description.
    pub fn ontology(&mut self, info: OntologyInfo) -> &mut Self {
        self.ontologies.insert(info.key.clone(), info);
        self
    }

    /// Imports one term, returning its newly issued code.
    pub fn term(&mut self, record: TermRecord) -> Result<CvId, CatalogError> {
        if record.accession.trim().is_empty() {
            return Err(CatalogError::MissingAccession);
        }
        let taken = self
            .accessions
            .get(&record.ontology)
            .is_some_and(|terms| terms.contains_key(&record.accession));
        if taken {
            return Err(CatalogError::DuplicateTerm {
                ontology: record.ontology,
                accession: record.accession,
            });
        }
        if !self.ontologies.contains_key(&record.ontology) {
            log::debug!("registering ontology {} on first term import", record.ontology);
            let key = record.ontology.clone();
            self.ontology(OntologyInfo::new(key.clone(), key, ""));
        }
        Ok(self.push(TermInfo {
            accession: record.accession,
            name: record.name,
            ontology: record.ontology,
            is_unit: record.is_unit,
        }))
    }

    /// Imports a batch of terms, stopping at the first rejected record.
    pub fn terms(
        &mut self,
        records: impl IntoIterator<Item = TermRecord>,
    ) -> Result<usize, CatalogError> {
        let mut count = 0;
        for record in records {
            self.term(record)?;
            count += 1;
        }
        Ok(count)
    }

    fn push(&mut self, info: TermInfo) -> CvId {
        let id = CvId(self.terms.len() as u32);
        self.accessions
            .entry(info.ontology.clone())
            .or_default()
            .insert(info.accession.clone(), id);
        self.terms.push(info);
        id
    }

    /// Freezes the catalog and builds its lookup indexes.
    pub fn build(self) -> Catalog {
        let mut any_accession = HashMap::new();
        let mut names: HashMap<String, HashMap<String, CvId>> = HashMap::new();
        for (code, info) in self.terms.iter().enumerate().skip(1) {
            let id = CvId(code as u32);
            any_accession.entry(info.accession.clone()).or_insert(id);
            names
                .entry(info.ontology.clone())
                .or_default()
                .entry(info.name.to_lowercase())
                .or_insert(id);
        }
        log::debug!(
            "catalog built with {} terms across {} ontologies",
            self.terms.len() - 1,
            self.ontologies.len()
        );
        Catalog {
            terms: self.terms,
            accessions: self.accessions,
            any_accession,
            names,
            ontologies: self.ontologies,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::{PSI_MS, UNIMOD, UO};

    #[test]
    fn resolve_builtin_accession() {
        let catalog = Catalog::builtin();
        let id = catalog.resolve(PSI_MS, "MS:1001469");
        assert_eq!(id, CvId::MS_TAXONOMY_SCIENTIFIC_NAME);
        assert_eq!(catalog.metadata(id).name, "taxonomy: scientific name");
        assert_eq!(catalog.metadata(id).ontology, PSI_MS);
    }

    #[test]
    fn resolve_miss_is_unknown() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve(PSI_MS, "MS:9999999"), CvId::UNKNOWN);
        // Right accession, wrong ontology.
        assert_eq!(catalog.resolve(UO, "MS:1001469"), CvId::UNKNOWN);
        assert_eq!(catalog.resolve("NOPE", "MS:1001469"), CvId::UNKNOWN);
    }

    #[test]
    fn unknown_metadata_is_placeholder() {
        let catalog = Catalog::builtin();
        let info = catalog.metadata(CvId::UNKNOWN);
        assert!(info.accession.is_empty());
        assert!(info.name.is_empty());
        assert!(!info.is_unit);
        assert_eq!(catalog.metadata(CvId(u32::MAX)), info);
    }

    #[test]
    fn resolve_by_name_ignores_case() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve_by_name(UNIMOD, "oxidation"), CvId::UNIMOD_OXIDATION);
        assert_eq!(catalog.resolve_by_name(UNIMOD, "OXIDATION"), CvId::UNIMOD_OXIDATION);
        assert_eq!(catalog.resolve_by_name(PSI_MS, "oxidation"), CvId::UNKNOWN);
    }

    #[test]
    fn unit_flag() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_unit(CvId::UO_DALTON));
        assert!(catalog.is_unit(CvId::MS_MZ));
        assert!(!catalog.is_unit(CvId::UNIMOD_PHOSPHO));
    }

    #[test]
    fn import_extends_after_builtin() {
        let mut builder = CatalogBuilder::builtin();
        let builtin_len = Catalog::builtin().len();
        let id = builder
            .term(TermRecord {
                accession: "MOD:00046".into(),
                name: "O-phospho-L-serine".into(),
                ontology: "PSI-MOD".into(),
                is_unit: false,
            })
            .unwrap();
        assert_eq!(id.code() as usize, builtin_len + 1);

        let catalog = builder.build();
        assert_eq!(catalog.resolve("PSI-MOD", "MOD:00046"), id);
        assert!(catalog.ontology("PSI-MOD").is_some());
    }

    #[test]
    fn import_rejects_duplicates_and_empty() {
        let mut builder = CatalogBuilder::builtin();
        let dup = builder.term(TermRecord {
            accession: "UNIMOD:35".into(),
            name: "Oxidation".into(),
            ontology: UNIMOD.into(),
            is_unit: false,
        });
        assert!(matches!(dup, Err(CatalogError::DuplicateTerm { .. })));

        let empty = builder.term(TermRecord {
            accession: " ".into(),
            name: "blank".into(),
            ontology: UNIMOD.into(),
            is_unit: false,
        });
        assert!(matches!(empty, Err(CatalogError::MissingAccession)));
    }

    #[test]
    fn every_term_resolves_to_itself() {
        let catalog = Catalog::builtin();
        for (id, info) in catalog.iter() {
            assert_eq!(catalog.resolve(&info.ontology, &info.accession), id);
        }
    }
}
