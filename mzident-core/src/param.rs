use crate::arena::Arenas;
use crate::catalog::{Catalog, CvId};
use crate::value_eq::{mix, SEED};
use crate::ValueEq;

/// Literal text of a term the catalog could not classify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermText {
    /// Canonical ontology key, or the document's alias when unrecognised.
    pub ontology: String,
    pub accession: String,
    pub name: String,
}

/// A controlled-vocabulary term as held by an annotation.
///
/// Known terms are just their code. Unknown terms also keep the literal text
/// they were read with, so writing them back reproduces the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Term {
    id: CvId,
    literal: Option<Box<TermText>>,
}

impl Term {
    pub fn new(id: CvId) -> Self {
        Term { id, literal: None }
    }

    /// An unclassified term carrying its literal text.
    pub fn unknown(
        ontology: impl Into<String>,
        accession: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Term {
            id: CvId::UNKNOWN,
            literal: Some(Box::new(TermText {
                ontology: ontology.into(),
                accession: accession.into(),
                name: name.into(),
            })),
        }
    }

    /// Classifies `(ontology, accession)` against the catalog.
    ///
    /// `ontology` must already be the canonical key. A miss in the named
    /// ontology falls back to an accession-only lookup before giving up.
    pub fn resolve(catalog: &Catalog, ontology: &str, accession: &str, name: &str) -> Self {
        let mut id = catalog.resolve(ontology, accession);
        if id.is_unknown() {
            id = catalog.resolve_accession(accession);
        }
        if id.is_unknown() {
            Term::unknown(ontology, accession, name)
        } else {
            Term::new(id)
        }
    }

    pub fn id(&self) -> CvId {
        self.id
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_unknown()
    }

    pub fn literal(&self) -> Option<&TermText> {
        self.literal.as_deref()
    }

    pub fn accession<'a>(&'a self, catalog: &'a Catalog) -> &'a str {
        match &self.literal {
            Some(text) => &text.accession,
            None => &catalog.metadata(self.id).accession,
        }
    }

    pub fn name<'a>(&'a self, catalog: &'a Catalog) -> &'a str {
        match &self.literal {
            Some(text) => &text.name,
            None => &catalog.metadata(self.id).name,
        }
    }

    /// Canonical key of the owning ontology.
    pub fn ontology<'a>(&'a self, catalog: &'a Catalog) -> &'a str {
        match &self.literal {
            Some(text) => &text.ontology,
            None => &catalog.metadata(self.id).ontology,
        }
    }
}

impl From<CvId> for Term {
    fn from(id: CvId) -> Self {
        Term::new(id)
    }
}

impl ValueEq for Term {
    fn value_eq(&self, other: &Self, _arenas: &Arenas) -> bool {
        if self.id != other.id {
            return false;
        }
        if !self.id.is_unknown() {
            return true;
        }
        // Two unclassifiable terms are only equal when their literal
        // accessions agree.
        let lhs = self.literal.as_ref().map(|t| t.accession.as_str());
        let rhs = other.literal.as_ref().map(|t| t.accession.as_str());
        lhs == rhs
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        let hash = mix(SEED, self.id.value_hash(arenas));
        match &self.literal {
            Some(text) if self.id.is_unknown() => mix(hash, text.accession.value_hash(arenas)),
            _ => hash,
        }
    }
}

/// A term-valued annotation with optional value and unit.
#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct CvParam {
    pub term: Term,
    pub value: Option<String>,
    pub unit: Option<Term>,
}

impl CvParam {
    pub fn new(term: impl Into<Term>) -> Self {
        CvParam {
            term: term.into(),
            value: None,
            unit: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<Term>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn id(&self) -> CvId {
        self.term.id()
    }
}

/// A free-form annotation.
#[derive(Debug, Clone, Default, PartialEq, ValueEq)]
pub struct UserParam {
    pub name: String,
    pub value: Option<String>,
    pub value_type: Option<String>,
    pub unit: Option<Term>,
}

impl UserParam {
    pub fn new(name: impl Into<String>) -> Self {
        UserParam {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// An annotation slot that takes either kind of parameter.
#[derive(Debug, Clone, PartialEq, ValueEq)]
pub enum Annotation {
    Cv(CvParam),
    User(UserParam),
}

impl Annotation {
    pub fn as_cv(&self) -> Option<&CvParam> {
        match self {
            Annotation::Cv(param) => Some(param),
            Annotation::User(_) => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserParam> {
        match self {
            Annotation::User(param) => Some(param),
            Annotation::Cv(_) => None,
        }
    }
}

impl From<CvParam> for Annotation {
    fn from(param: CvParam) -> Self {
        Annotation::Cv(param)
    }
}

impl From<UserParam> for Annotation {
    fn from(param: UserParam) -> Self {
        Annotation::User(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::{PSI_MS, UNIMOD};

    #[test]
    fn known_term_drops_literal() {
        let catalog = Catalog::builtin();
        let term = Term::resolve(&catalog, PSI_MS, "MS:1001469", "whatever");
        assert_eq!(term.id(), CvId::MS_TAXONOMY_SCIENTIFIC_NAME);
        assert!(term.literal().is_none());
        assert_eq!(term.name(&catalog), "taxonomy: scientific name");
    }

    #[test]
    fn unknown_term_reads_back_literal() {
        let catalog = Catalog::builtin();
        let term = Term::resolve(&catalog, "XYZ", "XYZ:42", "mystery");
        assert!(term.is_unknown());
        assert_eq!(term.ontology(&catalog), "XYZ");
        assert_eq!(term.accession(&catalog), "XYZ:42");
        assert_eq!(term.name(&catalog), "mystery");
    }

    #[test]
    fn unrecognised_alias_falls_back_to_accession() {
        let catalog = Catalog::builtin();
        let term = Term::resolve(&catalog, "unimod-local", "UNIMOD:35", "Oxidation");
        assert_eq!(term.id(), CvId::UNIMOD_OXIDATION);
        assert_eq!(term.ontology(&catalog), UNIMOD);
    }

    #[test]
    fn unknown_params_compare_literal_accession() {
        let arenas = Arenas::default();
        let a = CvParam::new(Term::unknown("XYZ", "XYZ:1", "one"));
        let b = CvParam::new(Term::unknown("XYZ", "XYZ:2", "two"));
        let c = CvParam::new(Term::unknown("XYZ", "XYZ:1", "renamed"));
        assert!(!a.value_eq(&b, &arenas));
        assert!(a.value_eq(&c, &arenas));
        assert_eq!(a.value_hash(&arenas), c.value_hash(&arenas));
    }

    #[test]
    fn cv_param_compares_value_and_unit() {
        let arenas = Arenas::default();
        let base = CvParam::new(CvId::MS_SEARCH_TOLERANCE_PLUS_VALUE).with_value("10");
        let ppm = base.clone().with_unit(CvId::UO_PARTS_PER_MILLION);
        let da = base.clone().with_unit(CvId::UO_DALTON);
        assert!(ppm.value_eq(&ppm.clone(), &arenas));
        assert!(!ppm.value_eq(&da, &arenas));
        assert!(!base.value_eq(&ppm, &arenas));
        assert!(!base.value_eq(&base.clone().with_value("20"), &arenas));
    }

    #[test]
    fn annotation_variants_never_match() {
        let arenas = Arenas::default();
        let cv = Annotation::from(CvParam::new(CvId::MS_MASCOT));
        let user = Annotation::from(UserParam::new("Mascot"));
        assert!(!cv.value_eq(&user, &arenas));
        assert!(cv.value_eq(&cv.clone(), &arenas));
    }
}
