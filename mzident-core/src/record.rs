//! Schema-level records exchanged with readers and writers.
//!
//! These mirror the wire format: references are plain identifier strings and
//! CV terms carry the document's local `cvRef`. Readers produce a
//! [`DocumentRecord`]; [`Document::from_record`](crate::Document::from_record)
//! turns it into a linked document and
//! [`Document::to_record`](crate::Document::to_record) goes back.

use serde::{Deserialize, Serialize};

use crate::translator::CvDeclaration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub creation_date: Option<String>,
    pub cv_list: Vec<CvRecord>,
    pub contacts: Vec<ContactRecord>,
    pub analysis_software: Vec<AnalysisSoftwareRecord>,
    pub samples: Vec<SampleRecord>,
    pub search_databases: Vec<SearchDatabaseRecord>,
    pub spectra_data: Vec<SpectraDataRecord>,
    pub db_sequences: Vec<DbSequenceRecord>,
    pub peptides: Vec<PeptideRecord>,
    pub peptide_evidence: Vec<PeptideEvidenceRecord>,
    pub protocols: Vec<ProtocolRecord>,
    pub identification_lists: Vec<IdentificationListRecord>,
}

/// One entry of the document's CV list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvRecord {
    pub id: String,
    pub full_name: String,
    pub uri: String,
    pub version: Option<String>,
}

impl From<&CvRecord> for CvDeclaration {
    fn from(record: &CvRecord) -> Self {
        CvDeclaration {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            uri: record.uri.clone(),
            version: record.version.clone(),
        }
    }
}

impl From<&CvDeclaration> for CvRecord {
    fn from(decl: &CvDeclaration) -> Self {
        CvRecord {
            id: decl.id.clone(),
            full_name: decl.full_name.clone(),
            uri: decl.uri.clone(),
            version: decl.version.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvParamRecord {
    pub cv_ref: String,
    pub accession: String,
    pub name: String,
    pub value: Option<String>,
    pub unit_cv_ref: Option<String>,
    pub unit_accession: Option<String>,
    pub unit_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserParamRecord {
    pub name: String,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
    pub unit_cv_ref: Option<String>,
    pub unit_accession: Option<String>,
    pub unit_name: Option<String>,
}

/// A slot holding exactly one of the two parameter kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamRecord {
    CvParam(CvParamRecord),
    UserParam(UserParamRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContactRecord {
    Person(PersonRecord),
    Organization(OrganizationRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mid_initials: Option<String>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRoleRecord {
    pub contact_ref: String,
    pub role: CvParamRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSoftwareRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub uri: Option<String>,
    pub software_name: Option<ParamRecord>,
    pub contact_role: Option<ContactRoleRecord>,
    pub customizations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub contact_roles: Vec<ContactRoleRecord>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchDatabaseRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<String>,
    pub num_database_sequences: Option<u64>,
    pub num_residues: Option<u64>,
    pub file_format: Option<CvParamRecord>,
    pub database_name: Option<ParamRecord>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpectraDataRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub file_format: Option<CvParamRecord>,
    pub spectrum_id_format: Option<CvParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DbSequenceRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub accession: Option<String>,
    pub length: Option<u32>,
    pub seq: Option<String>,
    pub search_database_ref: Option<String>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModificationRecord {
    pub location: Option<i32>,
    pub residues: Vec<String>,
    pub avg_mass_delta: Option<f64>,
    pub monoisotopic_mass_delta: Option<f64>,
    pub cv_params: Vec<CvParamRecord>,
    /// Free-text name, classified when no CV params are given.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubstitutionModificationRecord {
    pub original_residue: Option<String>,
    pub replacement_residue: Option<String>,
    pub location: Option<i32>,
    pub avg_mass_delta: Option<f64>,
    pub monoisotopic_mass_delta: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeptideRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub peptide_sequence: Option<String>,
    pub modifications: Vec<ModificationRecord>,
    pub substitution_modifications: Vec<SubstitutionModificationRecord>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeptideEvidenceRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub peptide_ref: Option<String>,
    pub db_sequence_ref: Option<String>,
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub pre: Option<String>,
    pub post: Option<String>,
    pub frame: Option<i32>,
    pub is_decoy: bool,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchModificationRecord {
    pub fixed_mod: Option<bool>,
    pub mass_delta: Option<f64>,
    pub residues: Vec<String>,
    pub cv_params: Vec<CvParamRecord>,
    pub specificity_rules: Vec<CvParamRecord>,
    /// Free-text name, classified when no CV params are given.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnzymeRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub semi_specific: Option<bool>,
    pub missed_cleavages: Option<u32>,
    pub min_distance: Option<u32>,
    pub site_regexp: Option<String>,
    pub enzyme_name: Vec<ParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub analysis_software_ref: Option<String>,
    pub search_type: Option<ParamRecord>,
    pub additional_search_params: Vec<ParamRecord>,
    pub modification_params: Vec<SearchModificationRecord>,
    pub enzymes: Vec<EnzymeRecord>,
    pub independent_enzymes: Option<bool>,
    pub parent_tolerance: Vec<CvParamRecord>,
    pub fragment_tolerance: Vec<CvParamRecord>,
    pub threshold: Vec<ParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentificationListRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub num_sequences_searched: Option<u64>,
    pub results: Vec<IdentificationResultRecord>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentificationResultRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "spectrumID")]
    pub spectrum_id: Option<String>,
    pub spectra_data_ref: Option<String>,
    pub items: Vec<IdentificationItemRecord>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentificationItemRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub charge_state: Option<i32>,
    pub experimental_mass_to_charge: Option<f64>,
    pub calculated_mass_to_charge: Option<f64>,
    #[serde(rename = "calculatedPI")]
    pub calculated_pi: Option<f64>,
    pub rank: Option<u32>,
    pub pass_threshold: Option<bool>,
    pub peptide_ref: Option<String>,
    pub peptide_evidence_refs: Vec<String>,
    pub cv_params: Vec<CvParamRecord>,
    pub user_params: Vec<UserParamRecord>,
}
