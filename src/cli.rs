use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use mediarisk::models::Typology;

#[derive(Parser, Debug)]
#[command(
    name = "mediarisk",
    about = "Screen entities against adverse media and score their risk",
    version
)]
pub struct Cli {
    /// Config file [default: ./.mediarisk/config.toml, fallback ~/.config/mediarisk/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train a typology classifier from a labeled `text,label` CSV
    Train(TrainArgs),
    /// Score one entity against a set of articles
    Analyze(AnalyzeArgs),
    /// Show which tokens drove the classification of a text
    Explain(ExplainArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled training corpus
    #[arg(long, value_name = "CSV")]
    pub corpus: PathBuf,

    /// Where to write the trained model
    #[arg(long, value_name = "FILE", default_value = "model.json")]
    pub out: PathBuf,

    /// Override the shuffle seed from the config
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Entity name as the analyst typed it
    pub name: String,

    /// Trained model file
    #[arg(long, value_name = "FILE", default_value = "model.json")]
    pub model: PathBuf,

    /// Article database (.csv) or entity snippets (.json)
    #[arg(long, value_name = "FILE")]
    pub articles: PathBuf,

    /// Measure recency from this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// PDF output path; use without value to default to risk-report.pdf
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "risk-report.pdf")]
    pub pdf: Option<PathBuf>,

    /// Hide evidence below this confidence (0.0 - 1.0)
    #[arg(long, value_name = "P", value_parser = parse_confidence)]
    pub min_confidence: Option<f64>,

    /// Only show evidence of this typology (repeatable)
    #[arg(long = "typology", value_name = "TYPOLOGY")]
    pub typologies: Vec<Typology>,
}

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Text to classify
    pub text: String,

    /// Trained model file
    #[arg(long, value_name = "FILE", default_value = "model.json")]
    pub model: PathBuf,

    /// Number of token contributions to show
    #[arg(long, default_value_t = 15)]
    pub top: usize,
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("{raw:?} is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Pdf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "mediarisk", "analyze", "Northstar Logistics Ltd",
            "--articles", "db.csv",
            "--typology", "sanctions",
            "--typology", "money_laundering",
            "--min-confidence", "0.6",
            "--pdf",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.name, "Northstar Logistics Ltd");
                assert_eq!(args.model, PathBuf::from("model.json"));
                assert_eq!(args.typologies, vec![Typology::Sanctions, Typology::MoneyLaundering]);
                assert_eq!(args.min_confidence, Some(0.6));
                assert_eq!(args.pdf, Some(PathBuf::from("risk-report.pdf")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_typology_rejected() {
        let res = Cli::try_parse_from(["mediarisk", "analyze", "Acme", "--articles", "a.csv", "--typology", "piracy"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mediarisk", "train", "--corpus", "c.csv", "-v", "--seed", "7"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Train(args) => assert_eq!(args.seed, Some(7)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_min_confidence_bounds() {
        let parse = |v: &str| {
            Cli::try_parse_from(["mediarisk", "analyze", "Acme", "--articles", "a.csv", "--min-confidence", v])
        };
        assert!(parse("0").is_ok());
        assert!(parse("1.0").is_ok());
        assert!(parse("1.5").is_err());
        assert!(parse("-0.1").is_err());
        assert!(parse("NaN").is_err());
        assert!(parse("high").is_err());
    }
}
