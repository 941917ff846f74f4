//! Readers for the files the command-line driver consumes: labeled training
//! corpora and article collections.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::{ArticleRecord, RawSnippet, Typology};

#[derive(Debug, Deserialize)]
struct TrainingRow {
    text: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct ArticleRow {
    entity_name: String,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    snippet: String,
    source: Option<String>,
    date: Option<String>,
    url: Option<String>,
}

/// Articles loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Articles {
    /// Multi-entity database; needs entity resolution.
    Database(Vec<ArticleRecord>),
    /// Snippets already scoped to the queried entity.
    Snippets(Vec<RawSnippet>),
}

/// Load a `text,label` CSV training corpus.
pub fn load_training_csv(path: &Path) -> Result<Vec<(String, Typology)>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open training corpus {}", path.display()))?;
    parse_training_csv(file).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_training_csv<R: Read>(reader: R) -> Result<Vec<(String, Typology)>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut corpus = Vec::new();

    for (idx, row) in csv.deserialize::<TrainingRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed training row {}", idx + 1))?;
        let label: Typology = row
            .label
            .parse()
            .with_context(|| format!("Training row {}", idx + 1))?;
        corpus.push((row.text, label));
    }

    Ok(corpus)
}

/// Load articles: `.json` is a list of snippets for one entity, anything else
/// is read as an article-database CSV.
pub fn load_articles(path: &Path) -> Result<Articles> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let snippets: Vec<RawSnippet> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snippets in {}", path.display()))?;
        return Ok(Articles::Snippets(snippets));
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open article database {}", path.display()))?;
    let records = parse_article_csv(file).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Articles::Database(records))
}

/// Parse an `entity_name,headline,snippet,source,date,url` CSV.
pub fn parse_article_csv<R: Read>(reader: R) -> Result<Vec<ArticleRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (idx, row) in csv.deserialize::<ArticleRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed article row {}", idx + 1))?;
        let published_at = row.date.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(row = idx + 1, date = raw, "ignoring unparseable article date");
            }
            parsed
        });

        records.push(ArticleRecord {
            entity_name: row.entity_name,
            snippet: RawSnippet {
                headline: row.headline,
                body_text: row.snippet,
                published_at,
                source_url: row.url.unwrap_or_default(),
                source: row.source,
            },
        });
    }

    Ok(records)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_training_csv() {
        let data = "text,label\n\"Acme hit by OFAC embargo\",sanctions\nRecord earnings,neutral\n";
        let corpus = parse_training_csv(data.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].1, Typology::Sanctions);
        assert_eq!(corpus[1].0, "Record earnings");
    }

    #[test]
    fn test_parse_training_csv_unknown_label() {
        let data = "text,label\nsomething,piracy\n";
        let err = parse_training_csv(data.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("piracy"));
    }

    #[test]
    fn test_parse_article_csv() {
        let data = "\
entity_name,headline,snippet,source,date,url,typology_gt
Northstar Logistics Ltd,Northstar linked to OFAC,Reports indicate...,Reuters,2025-03-04,http://x.test/a,sanctions
Vertex Global Corp,Vertex news,Analysts are optimistic,,,,neutral
Vertex Global Corp,Vertex update,Bad date,Bloomberg,yesterday,,neutral
";
        let records = parse_article_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].entity_name, "Northstar Logistics Ltd");
        assert_eq!(records[0].snippet.source.as_deref(), Some("Reuters"));
        assert_eq!(
            records[0].snippet.published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(records[1].snippet.published_at, None);
        assert_eq!(records[1].snippet.source, None);
        assert_eq!(records[1].snippet.source_url, "");
        assert_eq!(records[2].snippet.published_at, None);
    }

    #[test]
    fn test_parse_date_forms() {
        assert!(parse_date("2024-02-29").is_some());
        assert_eq!(
            parse_date("2024-02-29T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap())
        );
        assert!(parse_date("29/02/2024").is_none());
    }

    #[test]
    fn test_load_articles_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("acme.json");
        std::fs::write(
            &json_path,
            r#"[{"headline": "Acme fined", "body_text": "Regulator fines Acme", "published_at": "2026-01-02T00:00:00Z", "source_url": "http://x.test"}]"#,
        )
        .unwrap();
        match load_articles(&json_path).unwrap() {
            Articles::Snippets(s) => assert_eq!(s[0].headline, "Acme fined"),
            other => panic!("expected snippets, got {other:?}"),
        }

        let csv_path = dir.path().join("db.csv");
        std::fs::write(&csv_path, "entity_name,headline,snippet\nAcme,h,s\n").unwrap();
        match load_articles(&csv_path).unwrap() {
            Articles::Database(r) => assert_eq!(r.len(), 1),
            other => panic!("expected database, got {other:?}"),
        }
    }
}
