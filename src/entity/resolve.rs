use tracing::{debug, warn};

use crate::entity::normalize::{normalize, CanonicalName};
use crate::models::{ArticleRecord, RawSnippet};

/// Records of an article database that were filed under one canonical name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Entity name as spelled by the first matching record.
    pub display_name: Option<String>,
    pub snippets: Vec<RawSnippet>,
}

/// Select the records whose entity name normalizes to `query`.
///
/// Matching is exact equality of canonical names. Records whose entity name
/// does not normalize are skipped. Record order is preserved.
pub fn resolve(query: &CanonicalName, records: &[ArticleRecord]) -> Resolution {
    let mut resolution = Resolution::default();

    for record in records {
        let canonical = match normalize(&record.entity_name) {
            Ok(c) => c,
            Err(e) => {
                warn!(entity_name = %record.entity_name, error = %e, "skipping article record");
                continue;
            }
        };

        if &canonical == query {
            if resolution.display_name.is_none() {
                resolution.display_name = Some(record.entity_name.clone());
            }
            resolution.snippets.push(record.snippet.clone());
        }
    }

    debug!(
        query = %query,
        matched = resolution.snippets.len(),
        total = records.len(),
        "resolved entity against article records"
    );

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, headline: &str) -> ArticleRecord {
        ArticleRecord {
            entity_name: name.to_string(),
            snippet: RawSnippet::new(headline, ""),
        }
    }

    #[test]
    fn test_resolve_groups_name_variants() {
        let records = vec![
            record("Northstar Logistics Ltd", "a"),
            record("Vertex Global Corp", "b"),
            record("NORTHSTAR LOGISTICS", "c"),
            record("Northstar Logistics Limited.", "d"),
        ];
        let query = normalize("northstar logistics ltd.").unwrap();
        let res = resolve(&query, &records);

        assert_eq!(res.display_name.as_deref(), Some("Northstar Logistics Ltd"));
        let headlines: Vec<&str> = res.snippets.iter().map(|s| s.headline.as_str()).collect();
        assert_eq!(headlines, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_resolve_no_substring_match() {
        let records = vec![record("Northstar Logistics Ltd", "a")];
        let query = normalize("Northstar").unwrap();
        let res = resolve(&query, &records);
        assert!(res.snippets.is_empty());
        assert!(res.display_name.is_none());
    }

    #[test]
    fn test_resolve_skips_garbage_names() {
        let records = vec![record("???", "a"), record("Acme Inc", "b")];
        let query = normalize("acme").unwrap();
        let res = resolve(&query, &records);
        assert_eq!(res.snippets.len(), 1);
    }
}
