//! Classifier records
//!
//! A record is one category's linear classifier: a profile vector and the
//! score threshold at or above which a document is assigned the category.

use crate::error::{Error, Result};
use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Classifier records keyed by category name
pub type ClassifierSet = BTreeMap<String, ClassifierRecord>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRecord {
    #[serde(default)]
    pub threshold: f64,
    pub profile: SparseVector,
}

impl ClassifierRecord {
    pub fn new(profile: SparseVector) -> Self {
        Self {
            threshold: 0.0,
            profile,
        }
    }

    /// Dot product of `features` with the profile vector
    pub fn score(&self, features: &SparseVector) -> f64 {
        features.dot(&self.profile)
    }

    /// Whether `features` scores at or above the threshold
    pub fn accepts(&self, features: &SparseVector) -> bool {
        self.score(features) >= self.threshold
    }
}

/// Load classifier records from JSON
pub fn load_classifiers(path: &Path) -> Result<ClassifierSet> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::ClassifierParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save classifier records as pretty-printed JSON
pub fn save_classifiers(path: &Path, classifiers: &ClassifierSet) -> Result<()> {
    let content = serde_json::to_string_pretty(classifiers)?;
    std::fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
