//! CLI command definitions and handlers

mod estimate;
mod init;
mod trace;

use anyhow::Result;
use breakeven::config::load_config;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// breakeven - break-even point thresholds for linear text classifiers
#[derive(Parser, Debug)]
#[command(name = "breakeven")]
#[command(
    version,
    about = "Estimate classifier thresholds where precision meets recall",
    long_about = "breakeven scores a labeled validation set against each category's \
profile vector and places the category threshold at the break-even point, \
where precision and recall are as close to equal as possible.",
    after_help = "\
Examples:
  breakeven estimate -d val.jsonl -c classifiers.json            Tune every category in place
  breakeven estimate -d val.jsonl -c classifiers.json -o out.json --format json
  breakeven estimate -d val.jsonl -c classifiers.json --category earn --dry-run
  breakeven trace -d val.jsonl -c classifiers.json --category earn
  breakeven init                                                  Write an example breakeven.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./breakeven.toml, then the user config)
    #[arg(long, global = true, env = "BREAKEVEN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate thresholds and write them into the classifier file
    Estimate {
        /// Labeled validation documents (JSON Lines)
        #[arg(long, short = 'd')]
        docs: PathBuf,

        /// Classifier records (JSON object keyed by category)
        #[arg(long, short = 'c')]
        classifiers: PathBuf,

        /// Only estimate these categories (repeatable; default: all)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Where to write updated classifiers (default: overwrite --classifiers)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format: text, json (default from config)
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Report estimates without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Walk one category's score buckets and show every step
    Trace {
        /// Labeled validation documents (JSON Lines)
        #[arg(long, short = 'd')]
        docs: PathBuf,

        /// Classifier records (JSON object keyed by category)
        #[arg(long, short = 'c')]
        classifiers: PathBuf,

        /// Category to trace
        #[arg(long)]
        category: String,
    },

    /// Write an example breakeven.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path, force } => init::run(&path, force),

        Commands::Estimate {
            docs,
            classifiers,
            categories,
            output,
            format,
            dry_run,
        } => {
            let config = load_config(cli.config.as_deref(), Path::new("."))?;
            let format = format.unwrap_or_else(|| config.defaults.format.clone());
            estimate::run(
                &config,
                &docs,
                &classifiers,
                &categories,
                output.as_deref(),
                &format,
                dry_run,
            )
        }

        Commands::Trace {
            docs,
            classifiers,
            category,
        } => {
            let config = load_config(cli.config.as_deref(), Path::new("."))?;
            trace::run(&config, &docs, &classifiers, &category)
        }
    }
}
