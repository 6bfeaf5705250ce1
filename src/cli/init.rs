//! Init command - write an example breakeven.toml

use anyhow::{Context, Result};
use breakeven::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: &Path, force: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
