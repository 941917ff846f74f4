use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Normalized entity name; equality of canonical names is the grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `token` is a legal-entity suffix that carries no identity.
pub fn is_legal_suffix(token: &str) -> bool {
    matches!(
        token,
        "ltd"
            | "limited"
            | "llc"
            | "llp"
            | "lp"
            | "corp"
            | "inc"
            | "co"
            | "gmbh"
            | "ag"
            | "sa"
            | "srl"
            | "spa"
            | "bv"
            | "nv"
            | "plc"
            | "pte"
            | "pty"
            | "holdings"
            | "group"
    )
}

/// Canonicalize an entity name.
///
/// Lower-cases, drops punctuation (hyphens and apostrophes survive only
/// between two alphanumerics), collapses whitespace and then strips trailing
/// legal suffixes as whole words. A lone suffix is kept so that a company
/// literally called "Inc" still has a name.
///
/// The result is idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw_name: &str) -> Result<CanonicalName> {
    let lowered = raw_name.to_lowercase();
    let stripped = strip_punctuation(&lowered);

    let mut tokens: Vec<&str> = stripped.split_whitespace().collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|t| is_legal_suffix(t)) {
        tokens.pop();
    }

    let canonical = tokens.join(" ");
    if canonical.is_empty() {
        return Err(RiskError::InvalidEntityName(raw_name.to_string()));
    }

    Ok(CanonicalName(canonical))
}

fn strip_punctuation(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() {
            out.push(c);
        } else if c == '-' || c == '\'' {
            let prev_alnum = i > 0 && chars[i - 1].is_alphanumeric();
            let next_alnum = chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
            if prev_alnum && next_alnum {
                out.push(c);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(s: &str) -> String {
        normalize(s).unwrap().as_str().to_string()
    }

    #[test]
    fn test_basic_forms() {
        assert_eq!(norm("Acme Corp."), "acme");
        assert_eq!(norm("  ACME   corp  "), "acme");
        assert_eq!(norm("Northstar Logistics Ltd"), "northstar logistics");
        assert_eq!(norm("Silverline Holdings LLC"), "silverline");
        assert_eq!(norm("Acme Co., Ltd."), "acme");
    }

    #[test]
    fn test_suffix_whole_word_only() {
        assert_eq!(norm("Acme Corporation"), "acme corporation");
        assert_eq!(norm("Acme Corp"), "acme");
        assert_eq!(norm("Corpus Inc"), "corpus");
        assert_eq!(norm("Incorporated Widgets"), "incorporated widgets");
        assert_eq!(norm("Acme-Corp"), "acme-corp");
    }

    #[test]
    fn test_suffix_only_stripped_when_trailing() {
        assert_eq!(norm("Ltd Partners Group"), "ltd partners");
    }

    #[test]
    fn test_lone_suffix_kept() {
        assert_eq!(norm("Inc."), "inc");
        assert_eq!(norm("SA Inc"), "sa");
    }

    #[test]
    fn test_internal_hyphen_and_apostrophe() {
        assert_eq!(norm("O'Brien & Sons"), "o'brien sons");
        assert_eq!(norm("Jean-Luc  Picard"), "jean-luc picard");
        assert_eq!(norm("'quoted' - name -"), "quoted name");
        assert_eq!(norm("A.B.C. Trading"), "abc trading");
    }

    #[test]
    fn test_dotted_suffix() {
        assert_eq!(norm("Vertex Global S.A."), "vertex global");
        assert_eq!(norm("Chen Wei Trading L.L.C."), "chen wei trading");
    }

    #[test]
    fn test_empty_is_invalid() {
        assert!(matches!(normalize(""), Err(RiskError::InvalidEntityName(_))));
        assert!(matches!(normalize("   \t "), Err(RiskError::InvalidEntityName(_))));
        assert!(matches!(normalize("!!! ..."), Err(RiskError::InvalidEntityName(_))));
    }

    #[test]
    fn test_unicode_lowercase() {
        assert_eq!(norm("MÜLLER GmbH"), "müller");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in "[A-Za-z0-9 .,'&()-]{0,40}( (Inc|Ltd|Corp|LLC|GmbH|S\\.A\\.))?") {
            if let Ok(once) = normalize(&s) {
                let twice = normalize(once.as_str()).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn prop_case_insensitive(s in "[A-Za-z ]{1,30}") {
            let upper = normalize(&s.to_uppercase());
            let lower = normalize(&s.to_lowercase());
            match (upper, lower) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "case changed validity"),
            }
        }
    }
}
