//! Labeled documents
//!
//! Documents are stored as JSON Lines, one document per line:
//!
//! ```json
//! {"name": "d1", "features": {"0": 1.5, "7": 0.25}, "categories": ["X"]}
//! ```
//!
//! `categories` may be omitted or `null` for documents labeled into no
//! category.

use crate::error::{Error, Result};
use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// A document with its feature weights and ground-truth categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    pub features: SparseVector,
    /// Ground-truth labels; `None` means "not labeled into any category"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<String>>,
}

impl Document {
    pub fn new(name: impl Into<String>, features: SparseVector) -> Self {
        Self {
            name: name.into(),
            features,
            categories: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the ground truth places this document in `category`
    pub fn belongs_to(&self, category: &str) -> bool {
        self.categories
            .as_ref()
            .is_some_and(|cats| cats.contains(category))
    }
}

/// Load documents from a JSON Lines file
///
/// Blank lines are skipped; a malformed line fails with its 1-based line number.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_documents(BufReader::new(file), path)
}

pub(crate) fn read_documents<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let document = serde_json::from_str(&line).map_err(|source| Error::DocumentParse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        documents.push(document);
    }

    tracing::debug!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Write documents as JSON Lines
pub fn save_documents(path: &Path, documents: &[Document]) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(write_err)?;
    for document in documents {
        let json = serde_json::to_string(document)?;
        writeln!(file, "{}", json).map_err(write_err)?;
    }
    Ok(())
}
