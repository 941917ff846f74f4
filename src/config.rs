use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::models::{EvidenceFilter, Typology};

/// Root configuration structure, deserialized from `.mediarisk/config.toml`.
///
/// Every section and key is optional; missing values take the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub training: TrainingConfig,
    pub scoring: ScoringConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Reject values that would take scores or filters out of range.
    pub fn validate(&self) -> Result<()> {
        let horizon = self.scoring.recency_horizon_days;
        ensure!(
            horizon.is_finite() && horizon >= 0.0,
            "scoring.recency_horizon_days must be a finite number of days >= 0, got {horizon}"
        );
        let min = self.report.min_confidence;
        ensure!(
            (0.0..=1.0).contains(&min),
            "report.min_confidence must be within 0.0..=1.0, got {min}"
        );
        Ok(())
    }
}

/// Hyper-parameters for [`crate::classifier::train`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Vocabulary cap: the most document-frequent tokens are kept.
    pub max_features: usize,
    /// Every typology needs at least this many labeled examples.
    pub min_examples_per_class: usize,
    /// L2 penalty strength.
    pub l2: f64,
    /// Initial SGD step size.
    pub learning_rate: f64,
    /// Step size at epoch `e` is `learning_rate / (1 + decay * e)`.
    pub decay: f64,
    pub epochs: usize,
    /// Seed for the per-epoch shuffle.
    pub seed: u64,
    /// Re-weight examples inversely to class frequency.
    pub balanced: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            max_features: 1000,
            min_examples_per_class: 10,
            l2: 1e-3,
            learning_rate: 0.5,
            decay: 0.05,
            epochs: 40,
            seed: 42,
            balanced: true,
        }
    }
}

/// Tunables of [`crate::scoring::aggregate`]. The score weights are not among them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Age in days at which a snippet stops contributing to recency.
    pub recency_horizon_days: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            recency_horizon_days: 365.0,
        }
    }
}

/// Default analyst filters applied when rendering evidence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub min_confidence: f64,
    pub typologies: Vec<Typology>,
}

impl ReportConfig {
    pub fn to_filter(&self) -> EvidenceFilter {
        EvidenceFilter {
            min_confidence: self.min_confidence,
            typologies: self.typologies.clone(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.mediarisk/config.toml`
/// 3. `~/.config/mediarisk/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".mediarisk").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("mediarisk").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let cfg: Config = toml::from_str(
            r#"
[training]
epochs = 5
seed = 7

[scoring]
recency_horizon_days = 90.0

[report]
min_confidence = 0.5
typologies = ["sanctions", "money_laundering"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.training.epochs, 5);
        assert_eq!(cfg.training.seed, 7);
        assert_eq!(cfg.training.max_features, 1000);
        assert_eq!(cfg.scoring.recency_horizon_days, 90.0);
        let filter = cfg.report.to_filter();
        assert_eq!(filter.min_confidence, 0.5);
        assert_eq!(
            filter.typologies,
            vec![Typology::Sanctions, Typology::MoneyLaundering]
        );
    }

    #[test]
    fn test_override_path_and_project_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".mediarisk");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(cfg_dir.join("config.toml"), "[training]\nepochs = 3\n").unwrap();

        let project = load_config(dir.path(), None).unwrap();
        assert_eq!(project.training.epochs, 3);

        let other = dir.path().join("other.toml");
        std::fs::write(&other, "[training]\nepochs = 9\n").unwrap();
        let overridden = load_config(dir.path(), Some(&other)).unwrap();
        assert_eq!(overridden.training.epochs, 9);
    }

    #[test]
    fn test_missing_override_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path(), Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_rejects_bad_horizon_and_confidence() {
        let nan: Config = toml::from_str("[scoring]\nrecency_horizon_days = nan\n").unwrap();
        assert!(nan.validate().is_err());
        let negative: Config = toml::from_str("[scoring]\nrecency_horizon_days = -5.0\n").unwrap();
        assert!(negative.validate().is_err());
        let inf: Config = toml::from_str("[scoring]\nrecency_horizon_days = inf\n").unwrap();
        assert!(inf.validate().is_err());
        let conf: Config = toml::from_str("[report]\nmin_confidence = 1.5\n").unwrap();
        assert!(conf.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_reports_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[scoring]\nrecency_horizon_days = nan\n").unwrap();
        let err = load_config(dir.path(), Some(&path)).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Invalid config"));
        assert!(msg.contains("recency_horizon_days"));
    }
}
