use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, OntologyInfo};

/// One entry of a document's CV list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvDeclaration {
    /// The local alias terms in this document use as their `cvRef`.
    pub id: String,
    pub full_name: String,
    pub uri: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl CvDeclaration {
    fn from_ontology(info: &OntologyInfo) -> Self {
        CvDeclaration {
            id: info.key.clone(),
            full_name: info.full_name.clone(),
            uri: info.uri.clone(),
            version: info.version.clone(),
        }
    }
}

/// Maps a document's local CV aliases to canonical ontology keys and back.
///
/// Reading goes through [`to_canonical`](Self::to_canonical), writing through
/// [`to_local`](Self::to_local), so a document keeps the aliases it declared
/// across a read/write cycle.
#[derive(Debug, Clone, Default)]
pub struct CvTranslator {
    canonical: IndexMap<String, String>,
    local: IndexMap<String, String>,
    declarations: Vec<CvDeclaration>,
}

impl CvTranslator {
    /// Declares every catalog ontology under its canonical key.
    pub fn new(catalog: &Catalog) -> Self {
        let declarations = catalog.ontologies().map(CvDeclaration::from_ontology).collect();
        Self::from_declarations(declarations, catalog)
    }

    /// Builds the translator for a document's declared CV list.
    ///
    /// Declarations that match no catalog ontology map to themselves. When
    /// two declarations match the same ontology, the first one is used for
    /// output.
    pub fn from_declarations(declarations: Vec<CvDeclaration>, catalog: &Catalog) -> Self {
        let mut canonical = IndexMap::new();
        let mut local = IndexMap::new();
        for decl in &declarations {
            let key = match_ontology(decl, catalog)
                .map(|info| info.key.clone())
                .unwrap_or_else(|| decl.id.clone());
            canonical.entry(decl.id.clone()).or_insert_with(|| key.clone());
            local.entry(key).or_insert_with(|| decl.id.clone());
        }
        CvTranslator {
            canonical,
            local,
            declarations,
        }
    }

    /// Canonical key for a local alias. Unknown aliases pass through.
    pub fn to_canonical<'a>(&'a self, alias: &'a str) -> &'a str {
        self.canonical.get(alias).map(String::as_str).unwrap_or(alias)
    }

    /// Local alias for a canonical key, or the key itself when the document
    /// never declared that ontology.
    pub fn to_local<'a>(&'a self, key: &'a str) -> &'a str {
        self.local.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.local.contains_key(key)
    }

    pub fn declarations(&self) -> &[CvDeclaration] {
        &self.declarations
    }

    /// Adds a default declaration for `key` if the document lacks one.
    ///
    /// Returns true when a declaration was added.
    pub fn declare_missing(&mut self, key: &str, catalog: &Catalog) -> bool {
        if self.is_declared(key) {
            return false;
        }
        let decl = match catalog.ontology(key) {
            Some(info) => CvDeclaration::from_ontology(info),
            None => CvDeclaration {
                id: key.to_string(),
                full_name: key.to_string(),
                uri: String::new(),
                version: None,
            },
        };
        self.canonical.entry(decl.id.clone()).or_insert_with(|| key.to_string());
        self.local.insert(key.to_string(), decl.id.clone());
        self.declarations.push(decl);
        true
    }
}

fn match_ontology<'a>(decl: &CvDeclaration, catalog: &'a Catalog) -> Option<&'a OntologyInfo> {
    catalog.ontologies().find(|info| {
        info.key.eq_ignore_ascii_case(&decl.id)
            || info.aliases.iter().any(|a| a.eq_ignore_ascii_case(&decl.id))
            || (!decl.full_name.is_empty() && info.full_name.eq_ignore_ascii_case(&decl.full_name))
            || same_file(&info.uri, &decl.uri)
    })
}

/// Compares the last path segment of two ontology URIs.
fn same_file(a: &str, b: &str) -> bool {
    let file = |uri: &str| uri.trim_end_matches('/').rsplit('/').next().map(str::to_string);
    match (file(a), file(b)) {
        (Some(x), Some(y)) => !x.is_empty() && x.eq_ignore_ascii_case(&y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::{PSI_MS, UNIMOD, UO};

    fn decl(id: &str, full_name: &str, uri: &str) -> CvDeclaration {
        CvDeclaration {
            id: id.into(),
            full_name: full_name.into(),
            uri: uri.into(),
            version: None,
        }
    }

    #[test]
    fn default_translator_uses_canonical_keys() {
        let catalog = Catalog::builtin();
        let translator = CvTranslator::new(&catalog);
        assert_eq!(translator.to_local(PSI_MS), PSI_MS);
        assert_eq!(translator.to_canonical(UNIMOD), UNIMOD);
        assert_eq!(translator.declarations().len(), 3);
    }

    #[test]
    fn document_alias_round_trips() {
        let catalog = Catalog::builtin();
        let translator = CvTranslator::from_declarations(
            vec![
                decl("MS", "Proteomics Standards Initiative Mass Spectrometry Vocabularies", ""),
                decl("UNIMOD", "UNIMOD", "http://www.unimod.org/obo/unimod.obo"),
            ],
            &catalog,
        );
        assert_eq!(translator.to_canonical("MS"), PSI_MS);
        assert_eq!(translator.to_local(PSI_MS), "MS");
        assert_eq!(translator.to_local(UNIMOD), "UNIMOD");
        assert_eq!(translator.to_local(UO), UO);
    }

    #[test]
    fn matches_by_uri_file() {
        let catalog = Catalog::builtin();
        let translator = CvTranslator::from_declarations(
            vec![decl("units", "", "http://example.org/mirror/unit.obo")],
            &catalog,
        );
        assert_eq!(translator.to_canonical("units"), UO);
        assert_eq!(translator.to_local(UO), "units");
    }

    #[test]
    fn unknown_alias_passes_through() {
        let catalog = Catalog::builtin();
        let translator =
            CvTranslator::from_declarations(vec![decl("XYZ", "Some CV", "")], &catalog);
        assert_eq!(translator.to_canonical("XYZ"), "XYZ");
        assert_eq!(translator.to_canonical("never-declared"), "never-declared");
    }

    #[test]
    fn first_declaration_wins_for_output() {
        let catalog = Catalog::builtin();
        let translator = CvTranslator::from_declarations(
            vec![decl("MS", "", ""), decl("PSI-MS", "", "")],
            &catalog,
        );
        assert_eq!(translator.to_canonical("PSI-MS"), PSI_MS);
        assert_eq!(translator.to_local(PSI_MS), "MS");
    }

    #[test]
    fn declare_missing_adds_once() {
        let catalog = Catalog::builtin();
        let mut translator =
            CvTranslator::from_declarations(vec![decl("MS", "", "")], &catalog);
        assert!(translator.declare_missing(UNIMOD, &catalog));
        assert!(!translator.declare_missing(UNIMOD, &catalog));
        assert!(!translator.declare_missing(PSI_MS, &catalog));
        assert_eq!(translator.declarations().len(), 2);
        assert_eq!(translator.to_local(UNIMOD), UNIMOD);
    }
}
