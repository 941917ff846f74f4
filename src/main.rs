//! `mediarisk`: train a typology classifier and score entities against adverse media.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging.
//! 2. Load config ([`mediarisk::config::load_config`]).
//! 3. `train`: read the labeled corpus, fit, save the model.
//! 4. `analyze`: load model and articles, resolve the entity, run the
//!    [`mediarisk::Pipeline`], render the requested report ([`report`]).
//!    Exit `1` when the entity lands in the High band.
//! 5. `explain`: print the token contributions behind one classification.

mod cli;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{AnalyzeArgs, Cli, Command, ExplainArgs, ReportFormat, TrainArgs};
use mediarisk::classifier::{train_with_progress, TrainedModel};
use mediarisk::config::{load_config, Config};
use mediarisk::corpus::{self, Articles};
use mediarisk::entity::{normalize, resolve};
use mediarisk::models::{RiskBand, RiskProfile};
use mediarisk::Pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Train(args) => run_train(args, config, cli.quiet),
        Command::Analyze(args) => run_analyze(args, config, cli.verbose, cli.quiet),
        Command::Explain(args) => run_explain(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_train(args: TrainArgs, config: Config, quiet: bool) -> Result<()> {
    let mut training = config.training;
    if let Some(seed) = args.seed {
        training.seed = seed;
    }

    let corpus = corpus::load_training_csv(&args.corpus)?;
    if !quiet {
        eprintln!(
            "  {} {} labeled examples from {}",
            "→".cyan(),
            corpus.len(),
            args.corpus.display()
        );
    }

    let pb = if !quiet {
        let pb = ProgressBar::new(training.epochs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] epoch {pos}/{len}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let (model, training_report) = train_with_progress(&corpus, &training, |epoch| {
        if let Some(pb) = &pb {
            pb.set_position(epoch as u64);
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    model.save(&args.out)?;
    report::terminal::render_training_report(&training_report, quiet);
    if !quiet {
        println!(" Model written to: {}\n", args.out.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    display_name: Option<&'a str>,
    band: RiskBand,
    summary: String,
    #[serde(flatten)]
    profile: &'a RiskProfile,
}

fn run_analyze(args: AnalyzeArgs, config: Config, verbose: bool, quiet: bool) -> Result<()> {
    let as_of = match args.as_of.as_deref() {
        Some(raw) => corpus::parse_date(raw).ok_or_else(|| anyhow!("Invalid --as-of date {raw:?}"))?,
        None => Utc::now(),
    };

    let model = TrainedModel::load(&args.model)?;
    let pipeline = Pipeline::new(config.scoring).with_model(Arc::new(model));

    let (display_name, snippets) = match corpus::load_articles(&args.articles)? {
        Articles::Snippets(snippets) => (None, snippets),
        Articles::Database(records) => {
            let resolution = resolve(&normalize(&args.name)?, &records);
            (resolution.display_name, resolution.snippets)
        }
    };
    info!(articles = snippets.len(), "articles matched");

    let profile = pipeline.run_at(&args.name, snippets, as_of)?;

    let mut filter = config.report.to_filter();
    if let Some(min) = args.min_confidence {
        filter.min_confidence = min;
    }
    if !args.typologies.is_empty() {
        filter.typologies = args.typologies;
    }

    // --pdf implies PDF format
    let report_format = match &args.pdf {
        Some(_) => ReportFormat::Pdf,
        None => args.report,
    };
    let pdf_path = args.pdf.unwrap_or_else(|| PathBuf::from("risk-report.pdf"));

    match report_format {
        ReportFormat::Terminal => {
            report::terminal::render(&profile, display_name.as_deref(), &filter, verbose, quiet)?;
        }
        ReportFormat::Json => {
            let json = JsonReport {
                display_name: display_name.as_deref(),
                band: profile.band(),
                summary: profile.summary(),
                profile: &profile,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ReportFormat::Pdf => {
            report::pdf::render(&profile, display_name.as_deref(), &filter, &pdf_path)?;
        }
    }

    if profile.band() == RiskBand::High {
        std::process::exit(1);
    }

    Ok(())
}

fn run_explain(args: ExplainArgs) -> Result<()> {
    let model = TrainedModel::load(&args.model)?;
    let explanation = model.explain(&args.text);
    report::terminal::render_explanation(&args.text, &explanation, args.top);
    Ok(())
}
