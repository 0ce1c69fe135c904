//! Compiled-in ontology catalog.
//!
//! Codes are dense and start at 1; 0 is `CvId::UNKNOWN`. The builder pushes
//! these in order, so a term's code is also its slot in the catalog table.

use crate::catalog::CvId;

/// Canonical key of the PSI mass spectrometry vocabulary.
pub const PSI_MS: &str = "PSI-MS";
/// Canonical key of the UNIMOD modification ontology.
pub const UNIMOD: &str = "UNIMOD";
/// Canonical key of the unit ontology.
pub const UO: &str = "UO";

pub(crate) struct BuiltinOntology {
    pub key: &'static str,
    pub full_name: &'static str,
    pub uri: &'static str,
    pub aliases: &'static [&'static str],
}

pub(crate) const BUILTIN_ONTOLOGIES: &[BuiltinOntology] = &[
    BuiltinOntology {
        key: PSI_MS,
        full_name: "Proteomics Standards Initiative Mass Spectrometry Vocabularies",
        uri: "https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo",
        aliases: &["MS", "PSI-MS"],
    },
    BuiltinOntology {
        key: UNIMOD,
        full_name: "UNIMOD",
        uri: "http://www.unimod.org/obo/unimod.obo",
        aliases: &["UNIMOD"],
    },
    BuiltinOntology {
        key: UO,
        full_name: "UNIT-ONTOLOGY",
        uri: "https://raw.githubusercontent.com/bio-ontology-research-group/unit-ontology/master/unit.obo",
        aliases: &["UO", "UNIT-ONTOLOGY"],
    },
];

pub(crate) struct BuiltinTerm {
    pub code: u32,
    pub ontology: &'static str,
    pub accession: &'static str,
    pub name: &'static str,
    pub is_unit: bool,
}

macro_rules! builtin_terms {
    (@unit) => { false };
    (@unit unit) => { true };
    ($($name:ident = $code:literal => $ontology:ident, $accession:literal, $label:literal $(, $unit:ident)?;)*) => {
        impl CvId {
            $(
                #[doc = concat!("`", $accession, "` ", $label)]
                pub const $name: CvId = CvId::from_code($code);
            )*
        }

        pub(crate) const BUILTIN_TERMS: &[BuiltinTerm] = &[
            $(
                BuiltinTerm {
                    code: $code,
                    ontology: $ontology,
                    accession: $accession,
                    name: $label,
                    is_unit: builtin_terms!(@unit $($unit)?),
                },
            )*
        ];
    };
}

builtin_terms! {
    MS_UNKNOWN_MODIFICATION = 1 => PSI_MS, "MS:1001460", "unknown modification";
    MS_CHARGE_STATE = 2 => PSI_MS, "MS:1000041", "charge state";
    MS_MZ = 3 => PSI_MS, "MS:1000040", "m/z", unit;
    MS_SCAN_START_TIME = 4 => PSI_MS, "MS:1000016", "scan start time";
    MS_SPECTRUM_TITLE = 5 => PSI_MS, "MS:1000796", "spectrum title";
    MS_MZML_FORMAT = 6 => PSI_MS, "MS:1000584", "mzML format";
    MS_MASCOT_MGF_FORMAT = 7 => PSI_MS, "MS:1001062", "Mascot MGF format";
    MS_FASTA_FORMAT = 8 => PSI_MS, "MS:1001348", "FASTA format";
    MS_THERMO_NATIVEID_FORMAT = 9 => PSI_MS, "MS:1000768", "Thermo nativeID format";
    MS_MULTIPLE_PEAK_LIST_NATIVEID_FORMAT = 10 => PSI_MS, "MS:1000774", "multiple peak list nativeID format";
    MS_SCAN_NUMBER_ONLY_NATIVEID_FORMAT = 11 => PSI_MS, "MS:1000776", "scan number only nativeID format";
    MS_MS_MS_SEARCH = 12 => PSI_MS, "MS:1001083", "ms-ms search";
    MS_PROTEIN_DESCRIPTION = 13 => PSI_MS, "MS:1001088", "protein description";
    MS_DATABASE_NAME = 14 => PSI_MS, "MS:1001013", "database name";
    MS_DATABASE_TYPE_AMINO_ACID = 15 => PSI_MS, "MS:1001073", "database type amino acid";
    MS_PSM_SEARCH_ENGINE_SPECIFIC_STATISTIC = 16 => PSI_MS, "MS:1001143", "PSM-level search engine specific statistic";
    MS_MASCOT = 17 => PSI_MS, "MS:1001207", "Mascot";
    MS_MASCOT_SCORE = 18 => PSI_MS, "MS:1001171", "Mascot:score";
    MS_MASCOT_EXPECTATION_VALUE = 19 => PSI_MS, "MS:1001172", "Mascot:expectation value";
    MS_PARENT_MASS_TYPE_MONO = 20 => PSI_MS, "MS:1001211", "parent mass type mono";
    MS_FRAGMENT_MASS_TYPE_MONO = 21 => PSI_MS, "MS:1001256", "fragment mass type mono";
    MS_TRYPSIN = 22 => PSI_MS, "MS:1001251", "Trypsin";
    MS_TRYPSIN_P = 23 => PSI_MS, "MS:1001313", "Trypsin/P";
    MS_UNSPECIFIC_CLEAVAGE = 24 => PSI_MS, "MS:1001956", "unspecific cleavage";
    MS_MODIFICATION_SPECIFICITY_PEPTIDE_N_TERM = 25 => PSI_MS, "MS:1001189", "modification specificity peptide N-term";
    MS_MODIFICATION_SPECIFICITY_PEPTIDE_C_TERM = 26 => PSI_MS, "MS:1001190", "modification specificity peptide C-term";
    MS_SEARCH_TOLERANCE_PLUS_VALUE = 27 => PSI_MS, "MS:1001412", "search tolerance plus value";
    MS_SEARCH_TOLERANCE_MINUS_VALUE = 28 => PSI_MS, "MS:1001413", "search tolerance minus value";
    MS_TAXONOMY_NCBI_TAXID = 29 => PSI_MS, "MS:1001467", "taxonomy: NCBI TaxID";
    MS_TAXONOMY_SCIENTIFIC_NAME = 30 => PSI_MS, "MS:1001469", "taxonomy: scientific name";
    MS_NO_THRESHOLD = 31 => PSI_MS, "MS:1001494", "no threshold";
    MS_QUALITY_ESTIMATION_WITH_DECOY_DATABASE = 32 => PSI_MS, "MS:1001194", "quality estimation with decoy database";
    MS_FRAGMENT_NEUTRAL_LOSS = 33 => PSI_MS, "MS:1001524", "fragment neutral loss";
    MS_MSGF_PLUS = 34 => PSI_MS, "MS:1002048", "MS-GF+";
    MS_MSGF_RAW_SCORE = 35 => PSI_MS, "MS:1002049", "MS-GF:RawScore";
    MS_MSGF_DENOVO_SCORE = 36 => PSI_MS, "MS:1002050", "MS-GF:DeNovoScore";
    MS_MSGF_SPEC_EVALUE = 37 => PSI_MS, "MS:1002052", "MS-GF:SpecEValue";
    MS_MSGF_EVALUE = 38 => PSI_MS, "MS:1002053", "MS-GF:EValue";
    MS_MSGF_QVALUE = 39 => PSI_MS, "MS:1002054", "MS-GF:QValue";
    MS_MSGF_PEP_QVALUE = 40 => PSI_MS, "MS:1002055", "MS-GF:PepQValue";
    MS_CONTACT_NAME = 41 => PSI_MS, "MS:1000586", "contact name";
    MS_CONTACT_ADDRESS = 42 => PSI_MS, "MS:1000587", "contact address";
    MS_CONTACT_EMAIL = 43 => PSI_MS, "MS:1000589", "contact email";
    MS_CONTACT_AFFILIATION = 44 => PSI_MS, "MS:1000590", "contact affiliation";
    MS_SOFTWARE_VENDOR = 45 => PSI_MS, "MS:1001267", "software vendor";
    MS_RESEARCHER = 46 => PSI_MS, "MS:1001271", "researcher";

    UNIMOD_ACETYL = 47 => UNIMOD, "UNIMOD:1", "Acetyl";
    UNIMOD_AMIDATED = 48 => UNIMOD, "UNIMOD:2", "Amidated";
    UNIMOD_BIOTIN = 49 => UNIMOD, "UNIMOD:3", "Biotin";
    UNIMOD_CARBAMIDOMETHYL = 50 => UNIMOD, "UNIMOD:4", "Carbamidomethyl";
    UNIMOD_CARBAMYL = 51 => UNIMOD, "UNIMOD:5", "Carbamyl";
    UNIMOD_DEAMIDATED = 52 => UNIMOD, "UNIMOD:7", "Deamidated";
    UNIMOD_PHOSPHO = 53 => UNIMOD, "UNIMOD:21", "Phospho";
    UNIMOD_DEHYDRATED = 54 => UNIMOD, "UNIMOD:23", "Dehydrated";
    UNIMOD_GLU_PYRO_GLU = 55 => UNIMOD, "UNIMOD:27", "Glu->pyro-Glu";
    UNIMOD_GLN_PYRO_GLU = 56 => UNIMOD, "UNIMOD:28", "Gln->pyro-Glu";
    UNIMOD_METHYL = 57 => UNIMOD, "UNIMOD:34", "Methyl";
    UNIMOD_OXIDATION = 58 => UNIMOD, "UNIMOD:35", "Oxidation";
    UNIMOD_DIMETHYL = 59 => UNIMOD, "UNIMOD:36", "Dimethyl";
    UNIMOD_TRIMETHYL = 60 => UNIMOD, "UNIMOD:37", "Trimethyl";
    UNIMOD_SULFO = 61 => UNIMOD, "UNIMOD:40", "Sulfo";
    UNIMOD_GG = 62 => UNIMOD, "UNIMOD:121", "GG";
    UNIMOD_FORMYL = 63 => UNIMOD, "UNIMOD:122", "Formyl";
    UNIMOD_ITRAQ4PLEX = 64 => UNIMOD, "UNIMOD:214", "iTRAQ4plex";
    UNIMOD_LABEL_13C6_15N2 = 65 => UNIMOD, "UNIMOD:259", "Label:13C(6)15N(2)";
    UNIMOD_LABEL_13C6_15N4 = 66 => UNIMOD, "UNIMOD:267", "Label:13C(6)15N(4)";
    UNIMOD_NITRO = 67 => UNIMOD, "UNIMOD:354", "Nitro";
    UNIMOD_AMMONIA_LOSS = 68 => UNIMOD, "UNIMOD:385", "Ammonia-loss";
    UNIMOD_TMT6PLEX = 69 => UNIMOD, "UNIMOD:737", "TMT6plex";

    UO_SECOND = 70 => UO, "UO:0000010", "second", unit;
    UO_MINUTE = 71 => UO, "UO:0000031", "minute", unit;
    UO_PARTS_PER_MILLION = 72 => UO, "UO:0000169", "parts per million", unit;
    UO_PERCENT = 73 => UO, "UO:0000187", "percent", unit;
    UO_COUNT_UNIT = 74 => UO, "UO:0000189", "count unit", unit;
    UO_DALTON = 75 => UO, "UO:0000221", "dalton", unit;
    UO_ELECTRONVOLT = 76 => UO, "UO:0000266", "electronvolt", unit;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dense_from_one() {
        for (slot, term) in BUILTIN_TERMS.iter().enumerate() {
            assert_eq!(term.code as usize, slot + 1, "{}", term.accession);
        }
    }

    #[test]
    fn every_term_belongs_to_a_builtin_ontology() {
        for term in BUILTIN_TERMS {
            assert!(
                BUILTIN_ONTOLOGIES.iter().any(|o| o.key == term.ontology),
                "{} has no ontology",
                term.accession
            );
        }
    }
}
