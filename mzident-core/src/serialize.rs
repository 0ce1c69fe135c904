use std::cell::RefCell;

use indexmap::IndexSet;

use crate::arena::Arenas;
use crate::document::Document;
use crate::entity::{Kind, Registered};
use crate::model::{
    AnalysisSoftware, Contact, ContactRole, DbSequence, Enzyme, Modification, Peptide,
    PeptideEvidence, Sample, SearchDatabase, SearchModification, SpectraData,
    SpectrumIdentificationItem, SpectrumIdentificationList, SpectrumIdentificationProtocol,
    SpectrumIdentificationResult, SubstitutionModification,
};
use crate::param::{Annotation, CvParam, Term, UserParam};
use crate::record::{
    AnalysisSoftwareRecord, ContactRecord, ContactRoleRecord, CvParamRecord, CvRecord,
    DbSequenceRecord, DocumentRecord, EnzymeRecord, IdentificationItemRecord,
    IdentificationListRecord, IdentificationResultRecord, ModificationRecord, OrganizationRecord,
    ParamRecord, PeptideEvidenceRecord, PeptideRecord, PersonRecord, ProtocolRecord, SampleRecord,
    SearchDatabaseRecord, SearchModificationRecord, SpectraDataRecord,
    SubstitutionModificationRecord, UserParamRecord,
};
use crate::reference::Ref;

/// Converts document values back to records, tracking which ontologies the
/// output uses.
pub struct RecordWriter<'a> {
    doc: &'a Document,
    used: RefCell<IndexSet<String>>,
}

impl<'a> RecordWriter<'a> {
    pub fn new(doc: &'a Document) -> Self {
        RecordWriter {
            doc,
            used: RefCell::new(IndexSet::new()),
        }
    }

    pub fn arenas(&self) -> &'a Arenas {
        self.doc.arenas()
    }

    /// Canonical keys of every ontology written so far, in first-use order.
    pub fn into_used(self) -> IndexSet<String> {
        self.used.into_inner()
    }

    /// Local `cvRef`, accession and name of a term.
    fn term(&self, term: &Term) -> (String, String, String) {
        let catalog = self.doc.catalog();
        let ontology = term.ontology(catalog);
        if !ontology.is_empty() {
            self.used.borrow_mut().insert(ontology.to_string());
        }
        (
            self.doc.translator().to_local(ontology).to_string(),
            term.accession(catalog).to_string(),
            term.name(catalog).to_string(),
        )
    }

    fn unit(&self, unit: &Option<Term>) -> (Option<String>, Option<String>, Option<String>) {
        match unit {
            Some(term) => {
                let (cv_ref, accession, name) = self.term(term);
                (Some(cv_ref), Some(accession), Some(name))
            }
            None => (None, None, None),
        }
    }

    pub fn cv_param(&self, param: &CvParam) -> CvParamRecord {
        let (cv_ref, accession, name) = self.term(&param.term);
        let (unit_cv_ref, unit_accession, unit_name) = self.unit(&param.unit);
        CvParamRecord {
            cv_ref,
            accession,
            name,
            value: param.value.clone(),
            unit_cv_ref,
            unit_accession,
            unit_name,
        }
    }

    fn cv_params(&self, params: &[CvParam]) -> Vec<CvParamRecord> {
        params.iter().map(|p| self.cv_param(p)).collect()
    }

    pub fn user_param(&self, param: &UserParam) -> UserParamRecord {
        let (unit_cv_ref, unit_accession, unit_name) = self.unit(&param.unit);
        UserParamRecord {
            name: param.name.clone(),
            value: param.value.clone(),
            value_type: param.value_type.clone(),
            unit_cv_ref,
            unit_accession,
            unit_name,
        }
    }

    pub fn param(&self, annotation: &Annotation) -> ParamRecord {
        match annotation {
            Annotation::Cv(p) => ParamRecord::CvParam(self.cv_param(p)),
            Annotation::User(p) => ParamRecord::UserParam(self.user_param(p)),
        }
    }

    fn params(&self, annotations: &[Annotation]) -> Vec<ParamRecord> {
        annotations.iter().map(|a| self.param(a)).collect()
    }

    /// Splits annotations into the record's CV and user parameter lists.
    ///
    /// The record keeps the two kinds apart, so interleaved annotations come
    /// back CV first, then user, each in its original relative order.
    fn annotations(&self, annotations: &[Annotation]) -> (Vec<CvParamRecord>, Vec<UserParamRecord>) {
        let mut cv = Vec::new();
        let mut user = Vec::new();
        for annotation in annotations {
            match annotation {
                Annotation::Cv(p) => cv.push(self.cv_param(p)),
                Annotation::User(p) => user.push(self.user_param(p)),
            }
        }
        (cv, user)
    }

    /// Identifier text of a reference.
    pub fn reference<T: Kind>(&self, r: &Ref<T>) -> Option<String> {
        r.id(self.arenas()).map(str::to_string)
    }

    fn contact_role(&self, role: &ContactRole) -> ContactRoleRecord {
        ContactRoleRecord {
            contact_ref: self.reference(&role.contact).unwrap_or_default(),
            role: self.cv_param(&role.role),
        }
    }
}

/// Converts an entity to its record.
pub trait ToRecord {
    type Record;

    fn to_record(&self, writer: &RecordWriter<'_>) -> Self::Record;
}

impl ToRecord for Contact {
    type Record = ContactRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> ContactRecord {
        match self {
            Contact::Person(p) => {
                let (cv_params, user_params) = w.annotations(&p.annotations);
                ContactRecord::Person(PersonRecord {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    first_name: p.first_name.clone(),
                    last_name: p.last_name.clone(),
                    mid_initials: p.mid_initials.clone(),
                    cv_params,
                    user_params,
                })
            }
            Contact::Organization(o) => {
                let (cv_params, user_params) = w.annotations(&o.annotations);
                ContactRecord::Organization(OrganizationRecord {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    cv_params,
                    user_params,
                })
            }
        }
    }
}

impl ToRecord for AnalysisSoftware {
    type Record = AnalysisSoftwareRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> AnalysisSoftwareRecord {
        AnalysisSoftwareRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            uri: self.uri.clone(),
            software_name: self.software_name.as_ref().map(|a| w.param(a)),
            contact_role: self.developer.as_ref().map(|r| w.contact_role(r)),
            customizations: self.customizations.clone(),
        }
    }
}

impl ToRecord for Sample {
    type Record = SampleRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> SampleRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        SampleRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            contact_roles: self.contact_roles.iter().map(|r| w.contact_role(r)).collect(),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for SearchDatabase {
    type Record = SearchDatabaseRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> SearchDatabaseRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        SearchDatabaseRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            location: Some(self.location.clone()),
            version: self.version.clone(),
            release_date: self.release_date.clone(),
            num_database_sequences: self.num_database_sequences,
            num_residues: self.num_residues,
            file_format: self.file_format.as_ref().map(|p| w.cv_param(p)),
            database_name: self.database_name.as_ref().map(|a| w.param(a)),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for SpectraData {
    type Record = SpectraDataRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> SpectraDataRecord {
        SpectraDataRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            location: Some(self.location.clone()),
            file_format: self.file_format.as_ref().map(|p| w.cv_param(p)),
            spectrum_id_format: Some(w.cv_param(&self.spectrum_id_format)),
        }
    }
}

impl ToRecord for DbSequence {
    type Record = DbSequenceRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> DbSequenceRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        DbSequenceRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            accession: Some(self.accession.clone()),
            length: self.length,
            seq: self.sequence.clone(),
            search_database_ref: w.reference(&self.search_database),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for Modification {
    type Record = ModificationRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> ModificationRecord {
        ModificationRecord {
            location: self.location,
            residues: self.residues.clone(),
            avg_mass_delta: self.avg_mass_delta,
            monoisotopic_mass_delta: self.monoisotopic_mass_delta,
            cv_params: w.cv_params(&self.cv_params),
            name: None,
        }
    }
}

impl ToRecord for SubstitutionModification {
    type Record = SubstitutionModificationRecord;

    fn to_record(&self, _w: &RecordWriter<'_>) -> SubstitutionModificationRecord {
        SubstitutionModificationRecord {
            original_residue: Some(self.original_residue.clone()),
            replacement_residue: Some(self.replacement_residue.clone()),
            location: self.location,
            avg_mass_delta: self.avg_mass_delta,
            monoisotopic_mass_delta: self.monoisotopic_mass_delta,
        }
    }
}

impl ToRecord for Peptide {
    type Record = PeptideRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> PeptideRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        PeptideRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            peptide_sequence: Some(self.sequence.clone()),
            modifications: self.modifications.iter().map(|m| m.to_record(w)).collect(),
            substitution_modifications: self.substitutions.iter().map(|s| s.to_record(w)).collect(),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for PeptideEvidence {
    type Record = PeptideEvidenceRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> PeptideEvidenceRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        PeptideEvidenceRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            peptide_ref: w.reference(&self.peptide),
            db_sequence_ref: w.reference(&self.db_sequence),
            start: self.start,
            end: self.end,
            pre: self.pre.clone(),
            post: self.post.clone(),
            frame: self.frame,
            is_decoy: self.is_decoy,
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for SearchModification {
    type Record = SearchModificationRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> SearchModificationRecord {
        SearchModificationRecord {
            fixed_mod: Some(self.fixed),
            mass_delta: Some(self.mass_delta),
            residues: self.residues.clone(),
            cv_params: w.cv_params(&self.cv_params),
            specificity_rules: w.cv_params(&self.specificity_rules),
            name: None,
        }
    }
}

impl ToRecord for Enzyme {
    type Record = EnzymeRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> EnzymeRecord {
        EnzymeRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            semi_specific: self.semi_specific,
            missed_cleavages: self.missed_cleavages,
            min_distance: self.min_distance,
            site_regexp: self.site_regexp.clone(),
            enzyme_name: w.params(&self.enzyme_name),
        }
    }
}

impl ToRecord for SpectrumIdentificationProtocol {
    type Record = ProtocolRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> ProtocolRecord {
        ProtocolRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            analysis_software_ref: w.reference(&self.analysis_software),
            search_type: self.search_type.as_ref().map(|a| w.param(a)),
            additional_search_params: w.params(&self.additional_search_params),
            modification_params: self.modification_params.iter().map(|m| m.to_record(w)).collect(),
            enzymes: self.enzymes.iter().map(|e| e.to_record(w)).collect(),
            independent_enzymes: self.independent_enzymes,
            parent_tolerance: w.cv_params(&self.parent_tolerance),
            fragment_tolerance: w.cv_params(&self.fragment_tolerance),
            threshold: w.params(&self.threshold),
        }
    }
}

impl ToRecord for SpectrumIdentificationItem {
    type Record = IdentificationItemRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> IdentificationItemRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        IdentificationItemRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            charge_state: Some(self.charge_state),
            experimental_mass_to_charge: Some(self.experimental_mass_to_charge),
            calculated_mass_to_charge: self.calculated_mass_to_charge,
            calculated_pi: self.calculated_pi,
            rank: Some(self.rank),
            pass_threshold: Some(self.pass_threshold),
            peptide_ref: w.reference(&self.peptide),
            peptide_evidence_refs: self
                .peptide_evidence
                .iter()
                .filter_map(|r| w.reference(r))
                .collect(),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for SpectrumIdentificationResult {
    type Record = IdentificationResultRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> IdentificationResultRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        IdentificationResultRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            spectrum_id: Some(self.spectrum_id.clone()),
            spectra_data_ref: w.reference(&self.spectra_data),
            items: self.items.entities(w.arenas()).map(|i| i.to_record(w)).collect(),
            cv_params,
            user_params,
        }
    }
}

impl ToRecord for SpectrumIdentificationList {
    type Record = IdentificationListRecord;

    fn to_record(&self, w: &RecordWriter<'_>) -> IdentificationListRecord {
        let (cv_params, user_params) = w.annotations(&self.annotations);
        IdentificationListRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            num_sequences_searched: self.num_sequences_searched,
            results: self.results.entities(w.arenas()).map(|r| r.to_record(w)).collect(),
            cv_params,
            user_params,
        }
    }
}

impl Document {
    /// Converts the document to its record form.
    ///
    /// CV references are written with the document's local aliases; an
    /// ontology the document uses without declaring it gets a default
    /// declaration appended to the CV list.
    pub fn to_record(&self) -> DocumentRecord {
        let writer = RecordWriter::new(self);
        let mut record = DocumentRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            creation_date: self.creation_date.clone(),
            cv_list: Vec::new(),
            contacts: self.write_all::<Contact>(&writer),
            analysis_software: self.write_all::<AnalysisSoftware>(&writer),
            samples: self.write_all::<Sample>(&writer),
            search_databases: self.write_all::<SearchDatabase>(&writer),
            spectra_data: self.write_all::<SpectraData>(&writer),
            db_sequences: self.write_all::<DbSequence>(&writer),
            peptides: self.write_all::<Peptide>(&writer),
            peptide_evidence: self.write_all::<PeptideEvidence>(&writer),
            protocols: self.write_all::<SpectrumIdentificationProtocol>(&writer),
            identification_lists: self.write_all::<SpectrumIdentificationList>(&writer),
        };

        let mut translator = self.translator().clone();
        for key in writer.into_used() {
            if translator.declare_missing(&key, self.catalog()) {
                log::debug!("declaring undeclared ontology {key} on output");
            }
        }
        record.cv_list = translator.declarations().iter().map(CvRecord::from).collect();
        record
    }

    fn write_all<T: Registered + ToRecord>(&self, writer: &RecordWriter<'_>) -> Vec<T::Record> {
        self.registry::<T>()
            .entities(self.arenas())
            .map(|entity| entity.to_record(writer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Catalog, CvId};
    use crate::terms::{PSI_MS, UNIMOD};
    use crate::translator::{CvDeclaration, CvTranslator};

    fn declaration(id: &str) -> CvDeclaration {
        CvDeclaration {
            id: id.into(),
            full_name: String::new(),
            uri: String::new(),
            version: None,
        }
    }

    #[test]
    fn writes_local_alias_and_declares_missing() {
        let catalog = Arc::new(Catalog::builtin());
        let translator = CvTranslator::from_declarations(vec![declaration("MS")], &catalog);
        let mut doc = Document::with_translator(catalog, translator);
        doc.add(Peptide {
            id: Some("PEP_1".into()),
            sequence: "MPEPTIDE".into(),
            modifications: vec![Modification {
                location: Some(1),
                cv_params: vec![CvParam::new(CvId::UNIMOD_OXIDATION)],
                ..Default::default()
            }],
            annotations: vec![CvParam::new(CvId::MS_PROTEIN_DESCRIPTION).with_value("x").into()],
            ..Default::default()
        });

        let record = doc.to_record();
        let peptide = &record.peptides[0];
        assert_eq!(peptide.cv_params[0].cv_ref, "MS");
        assert_eq!(peptide.cv_params[0].accession, "MS:1001088");
        assert_eq!(peptide.modifications[0].cv_params[0].cv_ref, UNIMOD);

        let ids: Vec<&str> = record.cv_list.iter().map(|cv| cv.id.as_str()).collect();
        assert_eq!(ids, vec!["MS", UNIMOD]);
    }

    #[test]
    fn unknown_term_writes_literal() {
        let catalog = Arc::new(Catalog::builtin());
        let writer_doc = Document::new(catalog);
        let writer = RecordWriter::new(&writer_doc);
        let param = CvParam::new(Term::unknown("XYZ", "XYZ:7", "seven")).with_value("7");
        let record = writer.cv_param(&param);
        assert_eq!(record.cv_ref, "XYZ");
        assert_eq!(record.accession, "XYZ:7");
        assert_eq!(record.name, "seven");
        assert!(writer.into_used().contains("XYZ"));
    }

    #[test]
    fn unit_is_written() {
        let doc = Document::new(Arc::new(Catalog::builtin()));
        let writer = RecordWriter::new(&doc);
        let param = CvParam::new(CvId::MS_SEARCH_TOLERANCE_PLUS_VALUE)
            .with_value("10")
            .with_unit(CvId::UO_PARTS_PER_MILLION);
        let record = writer.cv_param(&param);
        assert_eq!(record.cv_ref, PSI_MS);
        assert_eq!(record.unit_accession.as_deref(), Some("UO:0000169"));
        assert_eq!(record.unit_name.as_deref(), Some("parts per million"));
    }

    #[test]
    fn interleaved_annotations_are_grouped_by_kind() {
        let catalog = Arc::new(Catalog::builtin());
        let mut doc = Document::new(catalog.clone());
        doc.add(Peptide {
            id: Some("PEP_1".into()),
            sequence: "PEPTIDE".into(),
            annotations: vec![
                UserParam::new("first").into(),
                CvParam::new(CvId::MS_PROTEIN_DESCRIPTION).with_value("x").into(),
                UserParam::new("second").into(),
                CvParam::new(CvId::MS_TAXONOMY_SCIENTIFIC_NAME).with_value("y").into(),
            ],
            ..Default::default()
        });

        let record = doc.to_record();
        let peptide = &record.peptides[0];
        let cv: Vec<&str> = peptide.cv_params.iter().map(|p| p.accession.as_str()).collect();
        let user: Vec<&str> = peptide.user_params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(cv, vec!["MS:1001088", "MS:1001469"]);
        assert_eq!(user, vec!["first", "second"]);

        // Reading back yields the grouped order, which is then stable.
        let back = Document::from_record(&record, catalog).unwrap();
        assert_eq!(back.to_record().peptides[0], *peptide);
    }
}
