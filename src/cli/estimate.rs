//! Estimate command - tune classifier thresholds on a validation set

use anyhow::{Context, Result};
use breakeven::classifier::{load_classifiers, save_classifiers, CategoryEstimate};
use breakeven::config::Config;
use breakeven::document::load_documents;
use breakeven::threshold::WalkOutcome;
use breakeven::ThresholdEstimator;
use console::style;
use std::path::Path;

/// Run the estimate command
pub fn run(
    config: &Config,
    docs_path: &Path,
    classifiers_path: &Path,
    categories: &[String],
    output: Option<&Path>,
    format: &str,
    dry_run: bool,
) -> Result<()> {
    let documents = load_documents(docs_path)
        .with_context(|| format!("Failed to load documents from {}", docs_path.display()))?;
    let mut classifiers = load_classifiers(classifiers_path).with_context(|| {
        format!(
            "Failed to load classifiers from {}",
            classifiers_path.display()
        )
    })?;

    let estimator = ThresholdEstimator::new(&config.estimation);
    let estimates = estimator.estimate_all(&documents, &mut classifiers, categories)?;

    let written = if dry_run {
        None
    } else {
        let target = output.unwrap_or(classifiers_path);
        save_classifiers(target, &classifiers)?;
        Some(target)
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&estimates)?),
        _ => print_text(&estimates, documents.len(), written),
    }

    Ok(())
}

fn outcome_label(outcome: WalkOutcome) -> &'static str {
    match outcome {
        WalkOutcome::NoDocuments => "no documents",
        WalkOutcome::EmptyCategory => "empty category",
        WalkOutcome::BreakEven => "break-even",
        WalkOutcome::Crossover { .. } => "crossover",
    }
}

fn print_text(estimates: &[CategoryEstimate], document_count: usize, written: Option<&Path>) {
    println!(
        "\n{} {} categories over {} documents\n",
        style("Break-even thresholds:").bold(),
        style(estimates.len()).cyan(),
        style(document_count).cyan()
    );

    println!(
        "  {:<24} {:>12} {:>8} {:>8} {:>8}  {}",
        style("category").dim(),
        style("threshold").dim(),
        style("bep").dim(),
        style("|C|").dim(),
        style("b/c").dim(),
        style("outcome").dim()
    );

    for e in estimates {
        let bep = if e.estimate.bep >= 0.75 {
            style(format!("{:.4}", e.estimate.bep)).green()
        } else if e.estimate.bep >= 0.5 {
            style(format!("{:.4}", e.estimate.bep)).yellow()
        } else {
            style(format!("{:.4}", e.estimate.bep)).red()
        };

        println!(
            "  {:<24} {:>12.6} {:>8} {:>8} {:>8}  {}",
            e.category,
            e.estimate.threshold,
            bep,
            e.in_category,
            format!("{}/{}", e.estimate.false_positives, e.estimate.false_negatives),
            style(outcome_label(e.estimate.outcome)).dim()
        );
    }

    match written {
        Some(path) => println!(
            "\n{} Wrote thresholds to {}",
            style("✓").green(),
            style(path.display()).cyan()
        ),
        None => println!("\n{} Dry run, nothing written", style("-").dim()),
    }
}
