//! Building a linked document from records.
//!
//! Entities are constructed bottom-up so that most references resolve on
//! construction; a final sweep picks up forward references.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::document::Document;
use crate::entity::Registered;
use crate::model::{
    AnalysisSoftware, Contact, ContactRole, DbSequence, Enzyme, Modification, Organization,
    Peptide, PeptideEvidence, Person, Sample, SearchDatabase, SearchModification, SpectraData,
    SpectrumIdentificationItem, SpectrumIdentificationList, SpectrumIdentificationProtocol,
    SpectrumIdentificationResult, SubstitutionModification,
};
use crate::param::{Annotation, CvParam, Term, UserParam};
use crate::record::{
    AnalysisSoftwareRecord, ContactRecord, ContactRoleRecord, CvParamRecord, DbSequenceRecord,
    DocumentRecord, EnzymeRecord, IdentificationItemRecord, IdentificationListRecord,
    IdentificationResultRecord, ModificationRecord, ParamRecord, PeptideEvidenceRecord,
    PeptideRecord, ProtocolRecord, SampleRecord, SearchDatabaseRecord, SearchModificationRecord,
    SpectraDataRecord, SubstitutionModificationRecord, UserParamRecord,
};
use crate::reference::{Lookup, Ref};
use crate::translator::{CvDeclaration, CvTranslator};

/// Error type for record construction.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("{kind} {id:?} is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        id: Option<String>,
        field: &'static str,
    },
    #[error("{kind} {id:?} is invalid: {reason}")]
    Invalid {
        kind: &'static str,
        id: Option<String>,
        reason: String,
    },
}

/// Builds an entity from its record.
///
/// `doc` supplies the catalog, the CV translator and the registries that
/// reference fields resolve against. The entity is not attached.
pub trait FromRecord: Sized {
    type Record;

    fn from_record(record: &Self::Record, doc: &Document) -> Result<Self, ConstructError>;
}

fn required<T: Clone>(
    value: &Option<T>,
    kind: &'static str,
    id: &Option<String>,
    field: &'static str,
) -> Result<T, ConstructError> {
    value.clone().ok_or_else(|| ConstructError::MissingField {
        kind,
        id: id.clone(),
        field,
    })
}

fn term(doc: &Document, cv_ref: &str, accession: &str, name: &str) -> Term {
    let ontology = doc.translator().to_canonical(cv_ref);
    Term::resolve(doc.catalog(), ontology, accession, name)
}

fn unit(
    doc: &Document,
    cv_ref: &Option<String>,
    accession: &Option<String>,
    name: &Option<String>,
) -> Option<Term> {
    let accession = accession.as_deref().filter(|a| !a.is_empty())?;
    Some(term(
        doc,
        cv_ref.as_deref().unwrap_or_default(),
        accession,
        name.as_deref().unwrap_or_default(),
    ))
}

pub(crate) fn cv_param(record: &CvParamRecord, doc: &Document) -> CvParam {
    CvParam {
        term: term(doc, &record.cv_ref, &record.accession, &record.name),
        value: record.value.clone(),
        unit: unit(doc, &record.unit_cv_ref, &record.unit_accession, &record.unit_name),
    }
}

fn cv_params(records: &[CvParamRecord], doc: &Document) -> Vec<CvParam> {
    records.iter().map(|r| cv_param(r, doc)).collect()
}

fn user_param(record: &UserParamRecord, doc: &Document) -> UserParam {
    UserParam {
        name: record.name.clone(),
        value: record.value.clone(),
        value_type: record.value_type.clone(),
        unit: unit(doc, &record.unit_cv_ref, &record.unit_accession, &record.unit_name),
    }
}

fn param(record: &ParamRecord, doc: &Document) -> Annotation {
    match record {
        ParamRecord::CvParam(p) => Annotation::Cv(cv_param(p, doc)),
        ParamRecord::UserParam(p) => Annotation::User(user_param(p, doc)),
    }
}

fn params(records: &[ParamRecord], doc: &Document) -> Vec<Annotation> {
    records.iter().map(|r| param(r, doc)).collect()
}

fn annotations(cv: &[CvParamRecord], user: &[UserParamRecord], doc: &Document) -> Vec<Annotation> {
    cv.iter()
        .map(|p| Annotation::Cv(cv_param(p, doc)))
        .chain(user.iter().map(|p| Annotation::User(user_param(p, doc))))
        .collect()
}

fn reference<T: Registered>(id: Option<&str>, doc: &Document) -> Ref<T> {
    let mut r = Ref::default();
    if let Some(id) = id {
        let lookup: &dyn Lookup<T> = doc;
        r.assign_id(id, Some(lookup));
    }
    r
}

fn contact_role(record: &ContactRoleRecord, doc: &Document) -> ContactRole {
    ContactRole {
        contact: reference(Some(record.contact_ref.as_str()), doc),
        role: cv_param(&record.role, doc),
    }
}

impl FromRecord for Contact {
    type Record = ContactRecord;

    fn from_record(record: &ContactRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(match record {
            ContactRecord::Person(p) => Contact::Person(Person {
                id: p.id.clone(),
                name: p.name.clone(),
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                mid_initials: p.mid_initials.clone(),
                annotations: annotations(&p.cv_params, &p.user_params, doc),
                context: None,
            }),
            ContactRecord::Organization(o) => Contact::Organization(Organization {
                id: o.id.clone(),
                name: o.name.clone(),
                annotations: annotations(&o.cv_params, &o.user_params, doc),
                context: None,
            }),
        })
    }
}

impl FromRecord for AnalysisSoftware {
    type Record = AnalysisSoftwareRecord;

    fn from_record(record: &AnalysisSoftwareRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(AnalysisSoftware {
            id: record.id.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
            uri: record.uri.clone(),
            software_name: record.software_name.as_ref().map(|p| param(p, doc)),
            developer: record.contact_role.as_ref().map(|r| contact_role(r, doc)),
            customizations: record.customizations.clone(),
            context: None,
        })
    }
}

impl FromRecord for Sample {
    type Record = SampleRecord;

    fn from_record(record: &SampleRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(Sample {
            id: record.id.clone(),
            name: record.name.clone(),
            contact_roles: record.contact_roles.iter().map(|r| contact_role(r, doc)).collect(),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

impl FromRecord for SearchDatabase {
    type Record = SearchDatabaseRecord;

    fn from_record(record: &SearchDatabaseRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(SearchDatabase {
            location: required(&record.location, "SearchDatabase", &record.id, "location")?,
            id: record.id.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
            release_date: record.release_date.clone(),
            num_database_sequences: record.num_database_sequences,
            num_residues: record.num_residues,
            file_format: record.file_format.as_ref().map(|p| cv_param(p, doc)),
            database_name: record.database_name.as_ref().map(|p| param(p, doc)),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

impl FromRecord for SpectraData {
    type Record = SpectraDataRecord;

    fn from_record(record: &SpectraDataRecord, doc: &Document) -> Result<Self, ConstructError> {
        let format = required(
            &record.spectrum_id_format,
            "SpectraData",
            &record.id,
            "spectrumIDFormat",
        )?;
        Ok(SpectraData {
            location: required(&record.location, "SpectraData", &record.id, "location")?,
            id: record.id.clone(),
            name: record.name.clone(),
            file_format: record.file_format.as_ref().map(|p| cv_param(p, doc)),
            spectrum_id_format: cv_param(&format, doc),
            context: None,
        })
    }
}

impl FromRecord for DbSequence {
    type Record = DbSequenceRecord;

    fn from_record(record: &DbSequenceRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(DbSequence {
            accession: required(&record.accession, "DBSequence", &record.id, "accession")?,
            id: record.id.clone(),
            name: record.name.clone(),
            length: record.length,
            sequence: record.seq.clone(),
            search_database: reference(record.search_database_ref.as_deref(), doc),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

fn modification(record: &ModificationRecord, doc: &Document) -> Modification {
    let mut params = cv_params(&record.cv_params, doc);
    if params.is_empty() {
        if let Some(name) = &record.name {
            params.push(doc.catalog().resolve_modification(name));
        }
    }
    Modification {
        location: record.location,
        residues: record.residues.clone(),
        avg_mass_delta: record.avg_mass_delta,
        monoisotopic_mass_delta: record.monoisotopic_mass_delta,
        cv_params: params,
    }
}

fn substitution(
    record: &SubstitutionModificationRecord,
    peptide: &Option<String>,
) -> Result<SubstitutionModification, ConstructError> {
    let kind = "SubstitutionModification";
    Ok(SubstitutionModification {
        original_residue: required(&record.original_residue, kind, peptide, "originalResidue")?,
        replacement_residue: required(
            &record.replacement_residue,
            kind,
            peptide,
            "replacementResidue",
        )?,
        location: record.location,
        avg_mass_delta: record.avg_mass_delta,
        monoisotopic_mass_delta: record.monoisotopic_mass_delta,
    })
}

impl FromRecord for Peptide {
    type Record = PeptideRecord;

    fn from_record(record: &PeptideRecord, doc: &Document) -> Result<Self, ConstructError> {
        let sequence = required(&record.peptide_sequence, "Peptide", &record.id, "peptideSequence")?;
        if sequence.is_empty() {
            return Err(ConstructError::Invalid {
                kind: "Peptide",
                id: record.id.clone(),
                reason: "empty peptide sequence".to_string(),
            });
        }
        let substitutions = record
            .substitution_modifications
            .iter()
            .map(|s| substitution(s, &record.id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Peptide {
            id: record.id.clone(),
            name: record.name.clone(),
            sequence,
            modifications: record.modifications.iter().map(|m| modification(m, doc)).collect(),
            substitutions,
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

impl FromRecord for PeptideEvidence {
    type Record = PeptideEvidenceRecord;

    fn from_record(record: &PeptideEvidenceRecord, doc: &Document) -> Result<Self, ConstructError> {
        if let (Some(start), Some(end)) = (record.start, record.end) {
            if start > end {
                return Err(ConstructError::Invalid {
                    kind: "PeptideEvidence",
                    id: record.id.clone(),
                    reason: format!("start {start} is after end {end}"),
                });
            }
        }
        Ok(PeptideEvidence {
            id: record.id.clone(),
            name: record.name.clone(),
            peptide: reference(record.peptide_ref.as_deref(), doc),
            db_sequence: reference(record.db_sequence_ref.as_deref(), doc),
            start: record.start,
            end: record.end,
            pre: record.pre.clone(),
            post: record.post.clone(),
            frame: record.frame,
            is_decoy: record.is_decoy,
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

fn search_modification(
    record: &SearchModificationRecord,
    protocol: &Option<String>,
    doc: &Document,
) -> Result<SearchModification, ConstructError> {
    let kind = "SearchModification";
    let mut params = cv_params(&record.cv_params, doc);
    if params.is_empty() {
        if let Some(name) = &record.name {
            params.push(doc.catalog().resolve_modification(name));
        }
    }
    Ok(SearchModification {
        fixed: required(&record.fixed_mod, kind, protocol, "fixedMod")?,
        mass_delta: required(&record.mass_delta, kind, protocol, "massDelta")?,
        residues: record.residues.clone(),
        cv_params: params,
        specificity_rules: cv_params(&record.specificity_rules, doc),
    })
}

fn enzyme(record: &EnzymeRecord, doc: &Document) -> Enzyme {
    Enzyme {
        id: record.id.clone(),
        name: record.name.clone(),
        semi_specific: record.semi_specific,
        missed_cleavages: record.missed_cleavages,
        min_distance: record.min_distance,
        site_regexp: record.site_regexp.clone(),
        enzyme_name: params(&record.enzyme_name, doc),
    }
}

impl FromRecord for SpectrumIdentificationProtocol {
    type Record = ProtocolRecord;

    fn from_record(record: &ProtocolRecord, doc: &Document) -> Result<Self, ConstructError> {
        let modification_params = record
            .modification_params
            .iter()
            .map(|m| search_modification(m, &record.id, doc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SpectrumIdentificationProtocol {
            id: record.id.clone(),
            name: record.name.clone(),
            analysis_software: reference(record.analysis_software_ref.as_deref(), doc),
            search_type: record.search_type.as_ref().map(|p| param(p, doc)),
            additional_search_params: params(&record.additional_search_params, doc),
            modification_params,
            enzymes: record.enzymes.iter().map(|e| enzyme(e, doc)).collect(),
            independent_enzymes: record.independent_enzymes,
            parent_tolerance: cv_params(&record.parent_tolerance, doc),
            fragment_tolerance: cv_params(&record.fragment_tolerance, doc),
            threshold: params(&record.threshold, doc),
            context: None,
        })
    }
}

/// Builds the list alone; its results are added by [`Document::from_record`].
impl FromRecord for SpectrumIdentificationList {
    type Record = IdentificationListRecord;

    fn from_record(record: &IdentificationListRecord, doc: &Document) -> Result<Self, ConstructError> {
        Ok(SpectrumIdentificationList {
            id: record.id.clone(),
            name: record.name.clone(),
            num_sequences_searched: record.num_sequences_searched,
            results: Default::default(),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

/// Builds the result alone; its items are added by [`Document::from_record`].
impl FromRecord for SpectrumIdentificationResult {
    type Record = IdentificationResultRecord;

    fn from_record(record: &IdentificationResultRecord, doc: &Document) -> Result<Self, ConstructError> {
        let kind = "SpectrumIdentificationResult";
        Ok(SpectrumIdentificationResult {
            spectrum_id: required(&record.spectrum_id, kind, &record.id, "spectrumID")?,
            id: record.id.clone(),
            name: record.name.clone(),
            spectra_data: reference(record.spectra_data_ref.as_deref(), doc),
            items: Default::default(),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

impl FromRecord for SpectrumIdentificationItem {
    type Record = IdentificationItemRecord;

    fn from_record(record: &IdentificationItemRecord, doc: &Document) -> Result<Self, ConstructError> {
        let kind = "SpectrumIdentificationItem";
        Ok(SpectrumIdentificationItem {
            charge_state: required(&record.charge_state, kind, &record.id, "chargeState")?,
            experimental_mass_to_charge: required(
                &record.experimental_mass_to_charge,
                kind,
                &record.id,
                "experimentalMassToCharge",
            )?,
            rank: required(&record.rank, kind, &record.id, "rank")?,
            pass_threshold: required(&record.pass_threshold, kind, &record.id, "passThreshold")?,
            id: record.id.clone(),
            name: record.name.clone(),
            calculated_mass_to_charge: record.calculated_mass_to_charge,
            calculated_pi: record.calculated_pi,
            peptide: reference(record.peptide_ref.as_deref(), doc),
            peptide_evidence: record
                .peptide_evidence_refs
                .iter()
                .map(|id| reference(Some(id.as_str()), doc))
                .collect(),
            annotations: annotations(&record.cv_params, &record.user_params, doc),
            context: None,
        })
    }
}

impl Document {
    /// Builds a linked document from a record.
    ///
    /// A record without a CV list gets the catalog's default declarations.
    pub fn from_record(record: &DocumentRecord, catalog: Arc<Catalog>) -> Result<Self, ConstructError> {
        let translator = if record.cv_list.is_empty() {
            CvTranslator::new(&catalog)
        } else {
            let declarations = record.cv_list.iter().map(CvDeclaration::from).collect();
            CvTranslator::from_declarations(declarations, &catalog)
        };
        let mut doc = Document::with_translator(catalog, translator);
        doc.id = record.id.clone();
        doc.name = record.name.clone();
        doc.version = record.version.clone();
        doc.creation_date = record.creation_date.clone();

        doc.add_records::<Contact>(&record.contacts)?;
        doc.add_records::<AnalysisSoftware>(&record.analysis_software)?;
        doc.add_records::<Sample>(&record.samples)?;
        doc.add_records::<SearchDatabase>(&record.search_databases)?;
        doc.add_records::<SpectraData>(&record.spectra_data)?;
        doc.add_records::<DbSequence>(&record.db_sequences)?;
        doc.add_records::<Peptide>(&record.peptides)?;
        doc.add_records::<PeptideEvidence>(&record.peptide_evidence)?;
        doc.add_records::<SpectrumIdentificationProtocol>(&record.protocols)?;

        for list_record in &record.identification_lists {
            let list = SpectrumIdentificationList::from_record(list_record, &doc)?;
            let list = doc.add(list);
            for result_record in &list_record.results {
                let result = SpectrumIdentificationResult::from_record(result_record, &doc)?;
                let result = doc.add_result(list, result);
                for item_record in &result_record.items {
                    let item = SpectrumIdentificationItem::from_record(item_record, &doc)?;
                    doc.add_item(result, item);
                }
            }
        }

        let resolved = doc.resolve_references();
        log::debug!("document constructed; {resolved} forward references resolved");
        Ok(doc)
    }

    fn add_records<T: Registered + FromRecord>(
        &mut self,
        records: &[T::Record],
    ) -> Result<(), ConstructError> {
        for record in records {
            let entity = T::from_record(record, self)?;
            self.add(entity);
        }
        Ok(())
    }
}
