use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mediarisk::classifier::{Explanation, TrainingReport};
use mediarisk::models::{EvidenceFilter, RawSnippet, RiskBand, RiskProfile, Severity};

use super::{excerpt, EXCERPT_CHARS};

/// Render a colored terminal report for one profile.
pub fn render(
    profile: &RiskProfile,
    display_name: Option<&str>,
    filter: &EvidenceFilter,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let relevant = profile.non_neutral_evidence().count();

    if quiet {
        println!(
            "{}  Score: {}  Band: {}  Evidence: {}/{}",
            profile.entity,
            format!("{:.1}", profile.score).bold(),
            colored_band(profile.band()),
            relevant,
            profile.evidence.len(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "mediarisk".bold(), env!("CARGO_PKG_VERSION"));
    match display_name {
        Some(name) => println!(" Entity: {} ({})\n", name, profile.entity),
        None => println!(" Entity: {}\n", profile.entity),
    }

    let primary = profile
        .primary_typology()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "None".to_string());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Risk score       : {:>5.1} / 100  {}", profile.score, colored_band(profile.band()))
    );
    println!(" │  {:<48} │", format!("Primary typology : {}", primary));
    println!(
        " │  {:<48} │",
        format!("Evidence         : {} relevant of {}", relevant, profile.evidence.len())
    );
    println!(" └────────────────────────────────────────────────────┘");
    println!(" {}\n", profile.summary().italic());

    if verbose {
        let b = &profile.breakdown;
        println!(" {} Score breakdown:\n", "[SCORE]".cyan().bold());
        println!("   avg confidence : {:.4}  (x 0.5)", b.avg_confidence);
        println!(
            "   volume         : {:.4}  (ln({} + 1) = {:.4}, x 0.3)",
            b.volume_score, b.non_neutral_count, b.volume_term
        );
        println!("   recency        : {:.4}  (x 0.2)\n", b.recency_score);
    }

    if !profile.top_typologies.is_empty() {
        println!(" {} Risk typologies:\n", "[TYPOLOGIES]".red().bold());
        render_typology_table(profile);
        println!();
    }

    let shown: Vec<_> = profile.filtered_evidence(filter).collect();
    if shown.is_empty() {
        if !profile.evidence.is_empty() {
            println!(" {} No evidence meets the current filter criteria.\n", "[EVIDENCE]".yellow().bold());
        }
        return Ok(());
    }

    println!(" {} Audit trail:\n", "[EVIDENCE]".yellow().bold());
    let mut table = evidence_table();
    for item in shown {
        let date = item
            .snippet
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            Cell::new(audit_text(&item.snippet)),
            Cell::new(item.snippet.source.as_deref().unwrap_or("—")),
            Cell::new(date),
            Cell::new(item.typology.to_string()).fg(severity_color(item.typology.severity())),
            Cell::new(format!("{:.0}%", item.confidence * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
    println!();

    Ok(())
}

/// Headline with the start of the body text on a second line.
fn audit_text(snippet: &RawSnippet) -> String {
    let body = excerpt(&snippet.body_text, EXCERPT_CHARS);
    if body.is_empty() {
        snippet.headline.clone()
    } else {
        format!("{}\n{}", snippet.headline, body)
    }
}

fn render_typology_table(profile: &RiskProfile) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Typology").add_attribute(Attribute::Bold),
            Cell::new("Weight").add_attribute(Attribute::Bold),
            Cell::new("Articles").add_attribute(Attribute::Bold),
            Cell::new("Severity").add_attribute(Attribute::Bold),
        ]);

    for tw in &profile.top_typologies {
        let articles = profile
            .evidence
            .iter()
            .filter(|e| e.typology == tw.typology)
            .count();
        let severity = tw.typology.severity();
        table.add_row(vec![
            Cell::new(tw.typology.to_string()),
            Cell::new(format!("{:.2}", tw.weight)).set_alignment(CellAlignment::Right),
            Cell::new(articles).set_alignment(CellAlignment::Right),
            Cell::new(severity.to_string()).fg(severity_color(severity)),
        ]);
    }

    println!("{}", table);
}

fn evidence_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Headline").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Typology").add_attribute(Attribute::Bold),
            Cell::new("Confidence").add_attribute(Attribute::Bold),
        ]);
    table
}

/// Print the per-token contributions behind one classification.
pub fn render_explanation(text: &str, explanation: &Explanation, limit: usize) {
    println!("\n {} {}", "Text:".bold(), text);
    println!(
        " {} {} ({:.0}%)\n",
        "Prediction:".bold(),
        explanation
            .typology
            .to_string()
            .color(colored_severity(explanation.typology.severity())),
        explanation.confidence * 100.0
    );

    if explanation.contributions.is_empty() {
        println!(" No known tokens; nothing to explain.\n");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Token").add_attribute(Attribute::Bold),
            Cell::new("TF-IDF").add_attribute(Attribute::Bold),
            Cell::new("Coefficient").add_attribute(Attribute::Bold),
            Cell::new("Contribution").add_attribute(Attribute::Bold),
        ]);

    for c in explanation.contributions.iter().take(limit) {
        let color = if c.contribution >= 0.0 { Color::Red } else { Color::Green };
        table.add_row(vec![
            Cell::new(&c.token),
            Cell::new(format!("{:.4}", c.feature_value)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.4}", c.coefficient)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.4}", c.contribution))
                .fg(color)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
    println!(
        " intercept {:+.4}  →  logit {:+.4}\n",
        explanation.intercept,
        explanation.logit()
    );
}

/// Print the class balance and fit statistics of a training run.
pub fn render_training_report(report: &TrainingReport, quiet: bool) {
    if quiet {
        println!(
            "Documents: {}  Vocabulary: {}  Accuracy: {:.1}%",
            report.documents,
            report.vocabulary_size,
            report.training_accuracy * 100.0
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Typology").add_attribute(Attribute::Bold),
            Cell::new("Examples").add_attribute(Attribute::Bold),
        ]);
    for (typology, count) in &report.class_counts {
        table.add_row(vec![
            Cell::new(typology.to_string()),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\n{}", table);
    println!(
        " {} documents, {} features, {} epochs",
        report.documents, report.vocabulary_size, report.epochs
    );
    println!(
        " training accuracy {}  final loss {:.4}\n",
        format!("{:.1}%", report.training_accuracy * 100.0).green().bold(),
        report.final_loss
    );
}

fn colored_band(band: RiskBand) -> ColoredString {
    match band {
        RiskBand::High => band.to_string().red().bold(),
        RiskBand::Medium => band.to_string().yellow().bold(),
        RiskBand::Low => band.to_string().green().bold(),
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::DarkGrey,
    }
}

fn colored_severity(severity: Severity) -> colored::Color {
    match severity {
        Severity::High => colored::Color::Red,
        Severity::Medium => colored::Color::Yellow,
        Severity::Low => colored::Color::White,
    }
}
