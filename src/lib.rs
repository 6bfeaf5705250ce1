//! breakeven - threshold estimation for linear text classifiers
//!
//! Places each category's decision threshold at the break-even point,
//! where precision and recall over a labeled validation set are as close
//! to equal as possible.

pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod sparse;
pub mod threshold;

pub use classifier::{estimate_threshold, ClassifierRecord, ClassifierSet, ThresholdEstimator};
pub use document::Document;
pub use error::{Error, Result, ThresholdError};
pub use sparse::SparseVector;
pub use threshold::{find_break_even, ScoreBuckets, ScoredDocument, ThresholdEstimate};
