//! Configuration for breakeven
//!
//! Loads settings from `breakeven.toml`, with environment overrides.
//!
//! # Configuration Format
//!
//! ```toml
//! # breakeven.toml
//!
//! [estimation]
//! empty_category_margin = 1.5  # threshold = margin * highest score for empty categories
//! epsilon = 1e-9               # tolerance when comparing precision/recall gaps
//!
//! [defaults]
//! format = "text"
//! ```
//!
//! Lookup order:
//! 1. Explicit `--config` path (must exist and parse)
//! 2. `./breakeven.toml`
//! 3. `~/.config/breakeven/config.toml`
//!
//! `BREAKEVEN_EMPTY_MARGIN` and `BREAKEVEN_EPSILON` override file values.

use crate::error::{Error, Result};
use crate::metrics::FP_COMPARISON_DELTA;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};


pub const CONFIG_FILE_NAME: &str = "breakeven.toml";

/// Output formats accepted by `breakeven estimate`
pub const OUTPUT_FORMATS: &[&str] = &["text", "json"];

/// Commented starter config written by `breakeven init`
pub const EXAMPLE_CONFIG: &str = r#"# breakeven configuration

[estimation]
# Empty categories get threshold = margin * highest observed score
empty_category_margin = 1.5

# Tolerance when comparing |precision - recall| on both sides of a crossover
epsilon = 1e-9

[defaults]
# Output format for `breakeven estimate` (text, json)
format = "text"
"#;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub estimation: EstimationConfig,

    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Threshold search settings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimationConfig {
    pub empty_category_margin: f64,
    pub epsilon: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            empty_category_margin: 1.5,
            epsilon: FP_COMPARISON_DELTA,
        }
    }
}

impl EstimationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.empty_category_margin.is_finite() || self.empty_category_margin <= 0.0 {
            return Err(Error::Config(format!(
                "empty_category_margin must be a positive number, got {}",
                self.empty_category_margin
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Default CLI settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliDefaults {
    pub format: String,
}

impl Default for CliDefaults {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

impl CliDefaults {
    pub fn validate(&self) -> Result<()> {
        if !OUTPUT_FORMATS.contains(&self.format.as_str()) {
            return Err(Error::Config(format!(
                "format must be one of {}, got '{}'",
                OUTPUT_FORMATS.join(", "),
                self.format
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.estimation.validate()?;
        self.defaults.validate()
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Get the user config path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("breakeven").join("config.toml"))
    }

    /// Apply environment overrides from an arbitrary lookup
    fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BREAKEVEN_EMPTY_MARGIN") {
            self.estimation.empty_category_margin = parse_env_f64("BREAKEVEN_EMPTY_MARGIN", &raw)?;
        }
        if let Some(raw) = lookup("BREAKEVEN_EPSILON") {
            self.estimation.epsilon = parse_env_f64("BREAKEVEN_EPSILON", &raw)?;
        }
        Ok(())
    }
}

fn parse_env_f64(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a number: '{}'", name, raw)))
}

/// Load configuration
///
/// An explicit path must load. Otherwise the working directory and user
/// config are tried in turn; unreadable files there are logged and skipped.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            let config = Config::from_file(path)?;
            debug!("Loaded config from {}", path.display());
            config
        }
        None => discover(working_dir),
    };

    config.apply_env_with(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

fn discover(working_dir: &Path) -> Config {
    let candidates = std::iter::once(working_dir.join(CONFIG_FILE_NAME))
        .chain(Config::user_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match Config::from_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    Config::default()
}
