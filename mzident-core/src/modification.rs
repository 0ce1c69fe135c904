use crate::catalog::{Catalog, CvId};
use crate::param::CvParam;
use crate::terms::UNIMOD;

const PREFIX: &str = "UNIMOD";

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '_' | '-' | '.') || c.is_whitespace()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &text[prefix.len()..],
        _ => text,
    }
}

/// Replaces every run of separators with a single `:`.
fn collapse_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if is_separator(c) {
            if !in_run {
                out.push(':');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

impl Catalog {
    /// Classifies a free-text modification name as a UNIMOD term.
    ///
    /// Accepts names (`Oxidation`), accessions in loose spellings
    /// (`UNIMOD:35`, `unimod_35`, `35`) and prefixed names (`Unimod:Phospho`).
    /// Text that matches nothing becomes `MS:1001460` (unknown modification)
    /// with the original text as its value.
    pub fn resolve_modification(&self, text: &str) -> CvParam {
        let stripped = strip_prefix_ignore_case(text.trim(), PREFIX);
        let lowered = stripped.to_lowercase();
        let normalized = lowered.trim().trim_start_matches(is_separator);

        if !normalized.is_empty() {
            let id = self.resolve_by_name(UNIMOD, normalized);
            if !id.is_unknown() {
                return CvParam::new(id);
            }
            let accession = format!("{PREFIX}:{}", collapse_separators(normalized));
            let id = self.resolve(UNIMOD, &accession);
            if !id.is_unknown() {
                return CvParam::new(id);
            }
        }

        log::debug!("modification {text:?} not found in {UNIMOD}");
        CvParam::new(CvId::MS_UNKNOWN_MODIFICATION).with_value(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> CvParam {
        Catalog::builtin().resolve_modification(text)
    }

    #[test]
    fn by_name() {
        assert_eq!(resolve("Oxidation").id(), CvId::UNIMOD_OXIDATION);
        assert_eq!(resolve("  phospho ").id(), CvId::UNIMOD_PHOSPHO);
        assert_eq!(resolve("Glu->pyro-Glu").id(), CvId::UNIMOD_GLU_PYRO_GLU);
    }

    #[test]
    fn prefixed_name() {
        assert_eq!(resolve("UNIMOD:Oxidation").id(), CvId::UNIMOD_OXIDATION);
        assert_eq!(resolve("Unimod_Carbamidomethyl").id(), CvId::UNIMOD_CARBAMIDOMETHYL);
    }

    #[test]
    fn by_accession() {
        assert_eq!(resolve("UNIMOD:35").id(), CvId::UNIMOD_OXIDATION);
        assert_eq!(resolve("unimod_21").id(), CvId::UNIMOD_PHOSPHO);
        assert_eq!(resolve("Unimod - 4").id(), CvId::UNIMOD_CARBAMIDOMETHYL);
        assert_eq!(resolve("737").id(), CvId::UNIMOD_TMT6PLEX);
    }

    #[test]
    fn miss_is_unknown_modification() {
        let param = resolve("Frobnicated");
        assert_eq!(param.id(), CvId::MS_UNKNOWN_MODIFICATION);
        assert_eq!(param.value.as_deref(), Some("Frobnicated"));

        let empty = resolve("UNIMOD:");
        assert_eq!(empty.id(), CvId::MS_UNKNOWN_MODIFICATION);
        assert_eq!(empty.value.as_deref(), Some("UNIMOD:"));
    }

    #[test]
    fn collapse_runs() {
        assert_eq!(collapse_separators("a-_ b"), "a:b");
        assert_eq!(collapse_separators("35"), "35");
    }
}
