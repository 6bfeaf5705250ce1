//! Sparse feature vectors
//!
//! Documents and profile vectors are both stored as feature-index → weight
//! maps. Only non-zero entries are meaningful; a missing index reads as 0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature index into the vocabulary
pub type FeatureIndex = u32;

/// Sparse weight vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector {
    entries: BTreeMap<FeatureIndex, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight at `index` (0 when absent)
    pub fn get(&self, index: FeatureIndex) -> f64 {
        self.entries.get(&index).copied().unwrap_or(0.0)
    }

    /// Set a weight; zero weights remove the entry
    pub fn set(&mut self, index: FeatureIndex, weight: f64) {
        if weight == 0.0 {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, weight);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product over the shared indices
    ///
    /// Walks the shorter vector and probes the longer one.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (short, long) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        short
            .entries
            .iter()
            .filter_map(|(i, w)| long.entries.get(i).map(|v| w * v))
            .sum()
    }
}

impl FromIterator<(FeatureIndex, f64)> for SparseVector {
    fn from_iter<T: IntoIterator<Item = (FeatureIndex, f64)>>(iter: T) -> Self {
        let mut vector = SparseVector::new();
        for (index, weight) in iter {
            vector.set(index, weight);
        }
        vector
    }
}
