//! Threshold setting for classifier records
//!
//! Scores every document against a category's profile vector, runs the
//! break-even walk and writes the resulting threshold into the record.

use super::record::{ClassifierRecord, ClassifierSet};
use crate::config::EstimationConfig;
use crate::document::Document;
use crate::error::{Error, Result, ThresholdError};
use crate::sparse::SparseVector;
use crate::threshold::{
    BepWalker, NoopObserver, ScoreBuckets, ScoredDocument, ThresholdEstimate, TracingObserver,
    WalkObserver, WalkOutcome,
};
use rayon::prelude::*;
use serde::Serialize;

/// Score documents against `profile`, labeling membership in `category`
pub fn score_documents<'a>(
    documents: &'a [Document],
    category: &str,
    profile: &SparseVector,
) -> Vec<ScoredDocument<'a>> {
    documents
        .iter()
        .map(|doc| {
            ScoredDocument::named(
                &doc.name,
                doc.features.dot(profile),
                doc.belongs_to(category),
            )
        })
        .collect()
}

/// Estimate with default settings and write the threshold into `record`
pub fn estimate_threshold(
    documents: &[Document],
    category: &str,
    record: &mut ClassifierRecord,
) -> std::result::Result<ThresholdEstimate, ThresholdError> {
    ThresholdEstimator::default().estimate(documents, category, record)
}

/// Estimate result for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryEstimate {
    pub category: String,
    pub documents: usize,
    pub in_category: usize,
    #[serde(flatten)]
    pub estimate: ThresholdEstimate,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdEstimator {
    walker: BepWalker,
}

impl Default for ThresholdEstimator {
    fn default() -> Self {
        Self::new(&EstimationConfig::default())
    }
}

impl ThresholdEstimator {
    pub fn new(config: &EstimationConfig) -> Self {
        // Profile and document weights are non-negative, so a cut below
        // zero never makes sense
        Self {
            walker: BepWalker {
                empty_category_floor: Some(0.0),
                ..BepWalker::from_config(config)
            },
        }
    }

    pub fn estimate(
        &self,
        documents: &[Document],
        category: &str,
        record: &mut ClassifierRecord,
    ) -> std::result::Result<ThresholdEstimate, ThresholdError> {
        self.estimate_observed(documents, category, record, &mut NoopObserver)
    }

    /// Estimate, reporting each walk step to `observer`
    pub fn estimate_observed(
        &self,
        documents: &[Document],
        category: &str,
        record: &mut ClassifierRecord,
        observer: &mut dyn WalkObserver,
    ) -> std::result::Result<ThresholdEstimate, ThresholdError> {
        let estimate = self.compute(documents, category, &record.profile, observer)?;
        record.threshold = estimate.threshold;
        Ok(estimate)
    }

    /// Run the walk for one category without touching its record
    fn compute(
        &self,
        documents: &[Document],
        category: &str,
        profile: &SparseVector,
        observer: &mut dyn WalkObserver,
    ) -> std::result::Result<ThresholdEstimate, ThresholdError> {
        let scored = score_documents(documents, category, profile);
        let buckets = ScoreBuckets::aggregate(&scored)?;
        let estimate = self.walker.estimate_observed(&buckets, observer)?;

        if estimate.outcome == WalkOutcome::EmptyCategory {
            tracing::warn!(
                "Category {} has no members among {} documents; threshold set to {}",
                category,
                documents.len(),
                estimate.threshold
            );
        }

        Ok(estimate)
    }

    /// Estimate every category in `classifiers`, or only those in `only`
    ///
    /// Categories are independent, so they run in parallel. Thresholds are
    /// written back only once every category has succeeded; on error no
    /// record changes. Results are sorted by category name.
    pub fn estimate_all(
        &self,
        documents: &[Document],
        classifiers: &mut ClassifierSet,
        only: &[String],
    ) -> Result<Vec<CategoryEstimate>> {
        if let Some(unknown) = only.iter().find(|c| !classifiers.contains_key(*c)) {
            return Err(Error::UnknownCategory(unknown.clone()));
        }

        let mut estimates = classifiers
            .par_iter()
            .filter(|(category, _)| only.is_empty() || only.contains(*category))
            .map(|(category, record)| -> std::result::Result<CategoryEstimate, ThresholdError> {
                let mut observer = TracingObserver::new(category);
                let estimate = self.compute(documents, category, &record.profile, &mut observer)?;
                let in_category = estimate.true_positives + estimate.false_negatives;

                tracing::info!(
                    "{}: threshold={:.6} bep={:.4} (a={}, b={}, c={})",
                    category,
                    estimate.threshold,
                    estimate.bep,
                    estimate.true_positives,
                    estimate.false_positives,
                    estimate.false_negatives
                );

                Ok(CategoryEstimate {
                    category: category.clone(),
                    documents: documents.len(),
                    in_category,
                    estimate,
                })
            })
            .collect::<std::result::Result<Vec<_>, ThresholdError>>()?;

        for e in &estimates {
            if let Some(record) = classifiers.get_mut(&e.category) {
                record.threshold = e.estimate.threshold;
            }
        }

        estimates.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(estimates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::{TraceEvent, VerboseObserver};

    const DELTA: f64 = 1e-9;

    /// Single-feature documents so the score equals the feature weight
    fn doc(name: &str, category: Option<&str>, weight: f64) -> Document {
        let doc = Document::new(name, [(0, weight)].into_iter().collect());
        match category {
            Some(c) => doc.with_categories([c]),
            None => doc,
        }
    }

    fn unit_profile() -> ClassifierRecord {
        ClassifierRecord::new([(0, 1.0)].into_iter().collect())
    }

    #[test]
    fn test_interleaved_documents() {
        let docs = vec![
            doc("d1", Some("X"), 7.3),
            doc("d2", Some("X"), 7.1),
            doc("d3", Some("Y"), 6.7),
            doc("d4", Some("X"), 5.4),
            doc("d5", Some("Y"), 5.1),
            doc("d6", Some("Z"), 4.9),
            doc("d7", Some("X"), 4.7),
        ];
        let mut record = unit_profile();

        let est = estimate_threshold(&docs, "X", &mut record).unwrap();
        assert!((est.bep - 0.75).abs() < DELTA);
        assert!((record.threshold - 5.4).abs() < DELTA);
    }

    #[test]
    fn test_single_member() {
        let docs = vec![doc("d1", Some("X"), 7.3)];
        let mut record = unit_profile();

        let est = estimate_threshold(&docs, "X", &mut record).unwrap();
        assert!((est.bep - 1.0).abs() < DELTA);
        assert!((record.threshold - 7.3).abs() < DELTA);
    }

    #[test]
    fn test_empty_category() {
        let docs = vec![doc("d0", None, 0.0), doc("d1", Some("Y"), 7.3)];
        let mut record = unit_profile();

        let est = estimate_threshold(&docs, "X", &mut record).unwrap();
        assert_eq!(est.bep, 1.0);
        assert!((record.threshold - 1.5 * 7.3).abs() < DELTA);
    }

    #[test]
    fn test_no_documents_resets_threshold() {
        let mut record = unit_profile();
        record.threshold = 3.0;

        let est = estimate_threshold(&[], "X", &mut record).unwrap();
        assert_eq!(est.bep, 1.0);
        assert_eq!(record.threshold, 0.0);
    }

    #[test]
    fn test_unlabeled_documents_only() {
        let docs = vec![doc("d0", None, 2.0), doc("d1", None, 1.0)];
        let mut record = unit_profile();

        estimate_threshold(&docs, "X", &mut record).unwrap();
        assert!((record.threshold - 3.0).abs() < DELTA);
    }

    #[test]
    fn test_empty_category_never_negative() {
        let docs = vec![doc("d0", Some("Y"), -2.0)];
        let mut record = unit_profile();

        estimate_threshold(&docs, "X", &mut record).unwrap();
        assert_eq!(record.threshold, 0.0);
    }

    #[test]
    fn test_duplicated_scores() {
        let layout: &[(&str, f64)] = &[
            ("X", 7.3), ("X", 7.3),
            ("X", 7.1), ("Y", 7.1), ("X", 7.1), ("Z", 7.1),
            ("Y", 5.8),
            ("W", 5.4), ("X", 5.4), ("Z", 5.4), ("Z", 5.4),
            ("X", 5.2),
            ("Z", 4.7), ("X", 4.7), ("X", 4.7), ("Y", 4.7),
            ("X", 4.2), ("W", 4.2),
            ("X", 4.1),
            ("W", 3.1), ("Y", 3.1), ("X", 3.1), ("X", 3.1),
            ("Z", 3.0), ("X", 3.0),
        ];
        let docs: Vec<_> = layout
            .iter()
            .enumerate()
            .map(|(i, (cat, w))| doc(&format!("d{}", i + 1), Some(*cat), *w))
            .collect();
        let mut record = unit_profile();

        let est = estimate_threshold(&docs, "X", &mut record).unwrap();
        assert!((est.bep - 0.5 * (6.0 / 12.0 + 6.0 / 13.0)).abs() < DELTA);
        assert!((record.threshold - 5.2).abs() < DELTA);
    }

    #[test]
    fn test_estimate_all_categories() {
        let docs = vec![
            doc("d1", Some("X"), 3.0),
            doc("d2", Some("Y"), 2.0),
            doc("d3", Some("X"), 1.0),
        ];
        let mut classifiers = ClassifierSet::new();
        classifiers.insert("Y".to_string(), unit_profile());
        classifiers.insert("X".to_string(), unit_profile());
        classifiers.insert("Z".to_string(), unit_profile());

        let estimates = ThresholdEstimator::default()
            .estimate_all(&docs, &mut classifiers, &[])
            .unwrap();

        let names: Vec<_> = estimates.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(names, ["X", "Y", "Z"]);
        assert_eq!(estimates[0].in_category, 2);
        assert_eq!(estimates[2].in_category, 0);

        for e in &estimates {
            assert_eq!(classifiers[&e.category].threshold, e.estimate.threshold);
        }
        assert!((classifiers["Z"].threshold - 4.5).abs() < DELTA);
    }

    #[test]
    fn test_estimate_selected_categories() {
        let docs = vec![doc("d1", Some("X"), 3.0)];
        let mut classifiers = ClassifierSet::new();
        classifiers.insert("X".to_string(), unit_profile());
        let mut untouched = unit_profile();
        untouched.threshold = 9.0;
        classifiers.insert("Y".to_string(), untouched);

        let estimator = ThresholdEstimator::default();
        let estimates = estimator
            .estimate_all(&docs, &mut classifiers, &["X".to_string()])
            .unwrap();
        assert_eq!(estimates.len(), 1);
        assert_eq!(classifiers["Y"].threshold, 9.0);

        let err = estimator
            .estimate_all(&docs, &mut classifiers, &["Q".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(c) if c == "Q"));
    }

    #[test]
    fn test_custom_margin_from_config() {
        let config = EstimationConfig {
            empty_category_margin: 2.0,
            ..EstimationConfig::default()
        };
        let docs = vec![doc("d1", Some("Y"), 2.0)];
        let mut record = unit_profile();

        ThresholdEstimator::new(&config)
            .estimate(&docs, "X", &mut record)
            .unwrap();
        assert_eq!(record.threshold, 4.0);
    }

    #[test]
    fn test_failed_category_leaves_all_records_untouched() {
        // Y's score overflows to infinity and cannot be bucketed
        let overflow = Document::new("d2", [(1, 1e200)].into_iter().collect()).with_categories(["Y"]);
        let docs = vec![doc("d1", Some("X"), 3.0), overflow];

        let mut classifiers = ClassifierSet::new();
        let mut x = unit_profile();
        x.threshold = 0.25;
        classifiers.insert("X".to_string(), x);
        let mut y = ClassifierRecord::new([(1, 1e200)].into_iter().collect());
        y.threshold = 0.5;
        classifiers.insert("Y".to_string(), y);

        let err = ThresholdEstimator::default()
            .estimate_all(&docs, &mut classifiers, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Threshold(ThresholdError::NonFiniteScore { .. })
        ));
        assert_eq!(classifiers["X"].threshold, 0.25);
        assert_eq!(classifiers["Y"].threshold, 0.5);
    }

    #[test]
    fn test_trace_finish_matches_written_threshold() {
        let docs = vec![doc("d0", Some("Y"), -2.0)];
        let mut record = unit_profile();
        let mut observer = VerboseObserver::default();

        ThresholdEstimator::default()
            .estimate_observed(&docs, "X", &mut record, &mut observer)
            .unwrap();

        assert_eq!(record.threshold, 0.0);
        assert_eq!(
            observer.events().last(),
            Some(&TraceEvent::Finish {
                threshold: record.threshold,
                bep: 1.0
            })
        );
    }
}
