use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::CanonicalName;
use crate::error::RiskError;

/// A news snippet about an entity, as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnippet {
    pub headline: String,
    pub body_text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_url: String,
    /// Publisher name (e.g. "Reuters"), only used for reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RawSnippet {
    pub fn new(headline: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            body_text: body_text.into(),
            published_at: None,
            source_url: String::new(),
            source: None,
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Text fed to the classifier: headline followed by body.
    pub fn text(&self) -> String {
        format!("{} {}", self.headline, self.body_text)
    }
}

/// One row of an article database: a snippet tagged with the entity name it was filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub entity_name: String,
    pub snippet: RawSnippet,
}

/// Financial-crime risk category.
///
/// Declaration order is significant: it is the tie-break order for every
/// ranking in the crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Typology {
    Sanctions,
    Fraud,
    MoneyLaundering,
    Corruption,
    HumanTrafficking,
    FinancialDistress,
    Neutral,
}

impl Typology {
    pub const ALL: [Typology; 7] = [
        Typology::Sanctions,
        Typology::Fraud,
        Typology::MoneyLaundering,
        Typology::Corruption,
        Typology::HumanTrafficking,
        Typology::FinancialDistress,
        Typology::Neutral,
    ];

    /// Position in declaration order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Corpus / serialization label.
    pub fn label(self) -> &'static str {
        match self {
            Typology::Sanctions => "sanctions",
            Typology::Fraud => "fraud",
            Typology::MoneyLaundering => "money_laundering",
            Typology::Corruption => "corruption",
            Typology::HumanTrafficking => "human_trafficking",
            Typology::FinancialDistress => "financial_distress",
            Typology::Neutral => "neutral",
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Typology::Neutral
    }

    /// How alarming a finding of this typology is on its own.
    pub fn severity(self) -> Severity {
        match self {
            Typology::Sanctions | Typology::MoneyLaundering | Typology::Corruption => {
                Severity::High
            }
            Typology::Fraud | Typology::HumanTrafficking | Typology::FinancialDistress => {
                Severity::Medium
            }
            Typology::Neutral => Severity::Low,
        }
    }
}

impl std::fmt::Display for Typology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typology::Sanctions => write!(f, "Sanctions"),
            Typology::Fraud => write!(f, "Fraud"),
            Typology::MoneyLaundering => write!(f, "Money Laundering"),
            Typology::Corruption => write!(f, "Corruption"),
            Typology::HumanTrafficking => write!(f, "Human Trafficking"),
            Typology::FinancialDistress => write!(f, "Financial Distress"),
            Typology::Neutral => write!(f, "Neutral"),
        }
    }
}

impl FromStr for Typology {
    type Err = RiskError;

    /// Accepts `money_laundering`, `money-laundering`, `Money Laundering`, `MoneyLaundering`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "sanctions" | "sanction" => Ok(Typology::Sanctions),
            "fraud" => Ok(Typology::Fraud),
            "moneylaundering" => Ok(Typology::MoneyLaundering),
            "corruption" => Ok(Typology::Corruption),
            "humantrafficking" => Ok(Typology::HumanTrafficking),
            "financialdistress" => Ok(Typology::FinancialDistress),
            "neutral" => Ok(Typology::Neutral),
            _ => Err(RiskError::UnknownTypology(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A snippet together with the classifier's verdict on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSnippet {
    pub snippet: RawSnippet,
    pub typology: Typology,
    /// Probability of `typology`, in `[0, 1]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypologyWeight {
    pub typology: Typology,
    /// Sum of confidences of the snippets classified as `typology`.
    pub weight: f64,
}

/// The sub-terms of a risk score, kept so the number can be recomputed by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub non_neutral_count: usize,
    pub avg_confidence: f64,
    /// `ln(non_neutral_count + 1)`.
    pub volume_term: f64,
    /// `volume_term` mapped onto `[0, 1]`.
    pub volume_score: f64,
    pub recency_score: f64,
}

/// Overall risk band derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score > 75.0 {
            RiskBand::High
        } else if score > 40.0 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "Low"),
            RiskBand::Medium => write!(f, "Medium"),
            RiskBand::High => write!(f, "High"),
        }
    }
}

/// Analyst-side view restriction on a profile's evidence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceFilter {
    pub min_confidence: f64,
    /// Typologies to keep; empty keeps all.
    pub typologies: Vec<Typology>,
}

impl EvidenceFilter {
    pub fn matches(&self, item: &ClassifiedSnippet) -> bool {
        item.confidence >= self.min_confidence
            && (self.typologies.is_empty() || self.typologies.contains(&item.typology))
    }
}

/// Risk assessment for one entity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub entity: CanonicalName,
    /// Composite score in `[0, 100]`.
    pub score: f64,
    pub top_typologies: Vec<TypologyWeight>,
    pub evidence: Vec<ClassifiedSnippet>,
    pub breakdown: ScoreBreakdown,
}

impl RiskProfile {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.score)
    }

    pub fn primary_typology(&self) -> Option<Typology> {
        self.top_typologies.first().map(|t| t.typology)
    }

    pub fn non_neutral_evidence(&self) -> impl Iterator<Item = &ClassifiedSnippet> {
        self.evidence.iter().filter(|e| !e.typology.is_neutral())
    }

    pub fn filtered_evidence<'a>(
        &'a self,
        filter: &'a EvidenceFilter,
    ) -> impl Iterator<Item = &'a ClassifiedSnippet> + 'a {
        self.evidence.iter().filter(move |e| filter.matches(e))
    }

    /// One-line human summary of the profile.
    pub fn summary(&self) -> String {
        if self.evidence.is_empty() {
            return "No adverse media found.".to_string();
        }
        if self.top_typologies.is_empty() {
            return "No significant risks detected.".to_string();
        }
        let primary: Vec<String> = self
            .top_typologies
            .iter()
            .take(2)
            .map(|t| t.typology.to_string())
            .collect();
        format!(
            "Found {} articles. Primary risks: {}",
            self.evidence.len(),
            primary.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typology_parse_variants() {
        assert_eq!("money_laundering".parse::<Typology>().unwrap(), Typology::MoneyLaundering);
        assert_eq!("Money Laundering".parse::<Typology>().unwrap(), Typology::MoneyLaundering);
        assert_eq!("human-trafficking".parse::<Typology>().unwrap(), Typology::HumanTrafficking);
        assert_eq!("NEUTRAL".parse::<Typology>().unwrap(), Typology::Neutral);
        assert!(matches!(
            "piracy".parse::<Typology>(),
            Err(RiskError::UnknownTypology(_))
        ));
    }

    #[test]
    fn test_typology_order_matches_all() {
        for (i, t) in Typology::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(t.label().parse::<Typology>().unwrap(), *t);
        }
        assert!(Typology::Sanctions < Typology::Neutral);
    }

    #[test]
    fn test_severity() {
        assert_eq!(Typology::Sanctions.severity(), Severity::High);
        assert_eq!(Typology::Fraud.severity(), Severity::Medium);
        assert_eq!(Typology::Neutral.severity(), Severity::Low);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(RiskBand::from_score(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(40.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(40.1), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(75.0), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(75.5), RiskBand::High);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Typology::FinancialDistress).unwrap();
        assert_eq!(json, "\"financial_distress\"");
    }

    #[test]
    fn test_filter() {
        let item = ClassifiedSnippet {
            snippet: RawSnippet::new("h", "b"),
            typology: Typology::Fraud,
            confidence: 0.6,
        };
        assert!(EvidenceFilter::default().matches(&item));
        assert!(!EvidenceFilter { min_confidence: 0.7, typologies: vec![] }.matches(&item));
        assert!(!EvidenceFilter {
            min_confidence: 0.0,
            typologies: vec![Typology::Sanctions]
        }
        .matches(&item));
    }
}
