//! Break-even point walk
//!
//! Walks score buckets from the highest score down while tracking
//! `b` (out-of-category documents above the cut) and `c` (in-category
//! documents below the cut). Precision equals recall exactly when
//! `b == c`, so the walk only has to find where `b` overtakes `c`:
//!
//! ```text
//!   a / (a + b) = a / (a + c)  <=>  b = c
//! ```
//!
//! When `b` jumps past `c` inside one bucket, the cut either keeps the
//! whole bucket or drops it, whichever leaves `|precision - recall|`
//! smaller. Equal differences keep the higher cut.

use super::aggregate::ScoreBuckets;
use super::observer::{NoopObserver, WalkObserver};
use crate::config::EstimationConfig;
use crate::error::ThresholdError;
use crate::metrics::{precision, recall};
use serde::Serialize;
use std::cmp::Ordering;

/// Which side of a crossover bucket the threshold landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverChoice {
    /// Threshold at the previous (higher) score; the bucket is excluded
    Previous,
    /// Threshold at the crossover bucket's score; the bucket is included
    Current,
}

/// How the walk terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WalkOutcome {
    /// No documents at all
    NoDocuments,
    /// The target category has no members
    EmptyCategory,
    /// A cut with `b == c` exists
    BreakEven,
    /// `b` overtook `c` inside a bucket
    Crossover { choice: CrossoverChoice },
}

/// Estimated threshold and the operating point it commits to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdEstimate {
    pub threshold: f64,
    /// Interpolated break-even point, `0.5 * (precision + recall)`
    pub bep: f64,
    pub precision: f64,
    pub recall: f64,
    /// `a`
    pub true_positives: usize,
    /// `b`
    pub false_positives: usize,
    /// `c`
    pub false_negatives: usize,
    pub outcome: WalkOutcome,
}

impl ThresholdEstimate {
    fn at(threshold: f64, a: usize, b: usize, c: usize, outcome: WalkOutcome) -> Self {
        let precision = precision(a, b);
        let recall = recall(a, c);
        Self {
            threshold,
            bep: 0.5 * (precision + recall),
            precision,
            recall,
            true_positives: a,
            false_positives: b,
            false_negatives: c,
            outcome,
        }
    }
}

/// `|precision - recall|` at an operating point
fn pr_gap(a: usize, b: usize, c: usize) -> f64 {
    (precision(a, b) - recall(a, c)).abs()
}

/// The threshold search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BepWalker {
    /// Multiplier on the highest score when the category is empty
    pub empty_category_margin: f64,
    /// Tolerance when comparing precision/recall gaps
    pub epsilon: f64,
    /// Lower bound on the empty-category threshold
    pub empty_category_floor: Option<f64>,
}

impl Default for BepWalker {
    fn default() -> Self {
        Self::from_config(&EstimationConfig::default())
    }
}

impl BepWalker {
    pub fn from_config(config: &EstimationConfig) -> Self {
        Self {
            empty_category_margin: config.empty_category_margin,
            epsilon: config.epsilon,
            empty_category_floor: None,
        }
    }

    pub fn estimate(&self, buckets: &ScoreBuckets) -> Result<ThresholdEstimate, ThresholdError> {
        self.estimate_observed(buckets, &mut NoopObserver)
    }

    /// Run the walk, reporting each step to `observer`
    pub fn estimate_observed(
        &self,
        buckets: &ScoreBuckets,
        observer: &mut dyn WalkObserver,
    ) -> Result<ThresholdEstimate, ThresholdError> {
        observer.on_start(buckets);

        let mut estimate = self.walk(buckets, observer)?;
        if let (WalkOutcome::EmptyCategory, Some(floor)) =
            (estimate.outcome, self.empty_category_floor)
        {
            estimate.threshold = estimate.threshold.max(floor);
        }

        observer.on_finish(&estimate);
        Ok(estimate)
    }

    fn walk(
        &self,
        buckets: &ScoreBuckets,
        observer: &mut dyn WalkObserver,
    ) -> Result<ThresholdEstimate, ThresholdError> {
        let Some(highest) = buckets.highest_score() else {
            return Ok(ThresholdEstimate::at(0.0, 0, 0, 0, WalkOutcome::NoDocuments));
        };

        let total = buckets.cat_doc_count();
        if total == 0 {
            // Nothing above the cut and nothing to recall
            return Ok(ThresholdEstimate::at(
                self.empty_category_margin * highest,
                0,
                0,
                0,
                WalkOutcome::EmptyCategory,
            ));
        }

        let mut b = 0;
        let mut c = total;
        let mut previous_score: Option<f64> = None;

        for bucket in buckets.iter() {
            let next_c = c - bucket.positive_count;
            let next_b = b + bucket.negative_count;
            observer.on_bucket(bucket, next_b, next_c);

            match next_b.cmp(&next_c) {
                Ordering::Less => {
                    b = next_b;
                    c = next_c;
                    previous_score = Some(bucket.score);
                }
                Ordering::Equal => {
                    return Ok(ThresholdEstimate::at(
                        bucket.score,
                        total - next_c,
                        next_b,
                        next_c,
                        WalkOutcome::BreakEven,
                    ));
                }
                Ordering::Greater => {
                    let current_diff = pr_gap(total - next_c, next_b, next_c);
                    let previous_diff = previous_score.map(|_| pr_gap(total - c, b, c));

                    let choice = match previous_diff {
                        Some(prev) if prev - current_diff <= self.epsilon => {
                            CrossoverChoice::Previous
                        }
                        _ => CrossoverChoice::Current,
                    };
                    observer.on_crossover(previous_diff, current_diff, choice);

                    let outcome = WalkOutcome::Crossover { choice };
                    return Ok(match (choice, previous_score) {
                        (CrossoverChoice::Previous, Some(score)) => {
                            ThresholdEstimate::at(score, total - c, b, c, outcome)
                        }
                        _ => ThresholdEstimate::at(
                            bucket.score,
                            total - next_c,
                            next_b,
                            next_c,
                            outcome,
                        ),
                    });
                }
            }
        }

        // The last bucket always leaves c == 0, so only inconsistent
        // counts can get here
        Err(ThresholdError::WalkExhausted {
            buckets: buckets.len(),
            b,
            c,
        })
    }
}

/// Estimate with default settings
pub fn find_break_even(buckets: &ScoreBuckets) -> Result<ThresholdEstimate, ThresholdError> {
    BepWalker::default().estimate(buckets)
}
