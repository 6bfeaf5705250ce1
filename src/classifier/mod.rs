//! Linear profile-vector classifiers
//!
//! Each category has a profile vector and a score threshold. Thresholds are
//! tuned on a labeled validation set with the break-even point method:
//! the cut is placed where precision and recall over the set are closest.

mod estimate;
mod record;

pub use estimate::{estimate_threshold, score_documents, CategoryEstimate, ThresholdEstimator};
pub use record::{load_classifiers, save_classifiers, ClassifierRecord, ClassifierSet};
