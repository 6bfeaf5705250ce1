//! Trace command - show the bucket walk for one category

use anyhow::{Context, Result};
use breakeven::classifier::{load_classifiers, score_documents};
use breakeven::config::Config;
use breakeven::document::load_documents;
use breakeven::threshold::{BucketMembers, CrossoverChoice, TraceEvent, VerboseObserver};
use breakeven::{Error, ThresholdEstimator};
use console::style;
use std::path::Path;

/// Run the trace command
///
/// The classifier file is only read; the traced threshold is not saved.
pub fn run(config: &Config, docs_path: &Path, classifiers_path: &Path, category: &str) -> Result<()> {
    let documents = load_documents(docs_path)
        .with_context(|| format!("Failed to load documents from {}", docs_path.display()))?;
    let classifiers = load_classifiers(classifiers_path).with_context(|| {
        format!(
            "Failed to load classifiers from {}",
            classifiers_path.display()
        )
    })?;

    let mut record = classifiers
        .get(category)
        .cloned()
        .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;

    let scored = score_documents(&documents, category, &record.profile);
    let mut observer = VerboseObserver::new(BucketMembers::collect(&scored));

    let estimate = ThresholdEstimator::new(&config.estimation).estimate_observed(
        &documents,
        category,
        &mut record,
        &mut observer,
    )?;

    println!("\n{} {}\n", style("Threshold walk for").bold(), style(category).cyan());
    for event in observer.events() {
        print_event(event);
    }

    println!(
        "\n  a={} b={} c={}  precision={:.4} recall={:.4}",
        estimate.true_positives,
        estimate.false_positives,
        estimate.false_negatives,
        estimate.precision,
        estimate.recall
    );
    Ok(())
}

fn names(list: &[String]) -> String {
    if list.is_empty() {
        return String::new();
    }
    format!(" {} ", list.join(" "))
}

fn print_event(event: &TraceEvent) {
    match event {
        TraceEvent::Start {
            buckets,
            in_category,
            out_of_category,
        } => println!(
            "  {} distinct scores, |C|={} |~C|={}  (b=0 c={})",
            style(buckets).cyan(),
            in_category,
            out_of_category,
            in_category
        ),
        TraceEvent::Bucket {
            score,
            positive_count,
            negative_count,
            b,
            c,
            in_category,
            out_of_category,
        } => {
            println!(
                "  @ {:<12.6} |C|={:05} |~C|={:05} (b={:05} c={:05})",
                score, positive_count, negative_count, b, c
            );
            println!("       C = {{{}}}", names(in_category));
            println!("      ~C = {{{}}}", names(out_of_category));
        }
        TraceEvent::Crossover {
            previous_diff,
            current_diff,
            choice,
        } => {
            let side = match choice {
                CrossoverChoice::Previous => "previous bucket",
                CrossoverChoice::Current => "this bucket",
            };
            let previous = previous_diff
                .map(|d| format!("{:.6}", d))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} b > c: |p-r| before={} after={:.6}, threshold at {}",
                style("↳").yellow(),
                previous,
                current_diff,
                side
            );
        }
        TraceEvent::Finish { threshold, bep } => println!(
            "\n  {} threshold={} bep={}",
            style("✓").green(),
            style(format!("{:.6}", threshold)).cyan(),
            style(format!("{:.4}", bep)).cyan()
        ),
    }
}
