//! Score aggregation
//!
//! Reduces scored documents into buckets keyed by distinct score, sorted
//! from the highest score down.

use crate::error::ThresholdError;
use serde::Serialize;

/// A document's score against a profile vector plus its ground-truth label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument<'a> {
    /// Dot product with the profile vector
    pub score: f64,
    /// Whether the document belongs to the target category
    pub in_category: bool,
    /// Document name, only used for tracing
    pub name: Option<&'a str>,
}

impl<'a> ScoredDocument<'a> {
    pub fn new(score: f64, in_category: bool) -> Self {
        Self {
            score,
            in_category,
            name: None,
        }
    }

    pub fn named(name: &'a str, score: f64, in_category: bool) -> Self {
        Self {
            score,
            in_category,
            name: Some(name),
        }
    }
}

/// Documents sharing one exact score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBucket {
    pub score: f64,
    /// In-category documents with this score
    pub positive_count: usize,
    /// Out-of-category documents with this score
    pub negative_count: usize,
}

/// Score buckets in descending score order
///
/// Invariant: `positive_count` over all buckets sums to `cat_doc_count`,
/// and no bucket is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBuckets {
    buckets: Vec<ScoreBucket>,
    cat_doc_count: usize,
}

/// Normalize a score into a bucket key.
///
/// Keys merge only when bit-identical, except that `-0.0` folds into `0.0`.
pub(crate) fn score_key(score: f64) -> Result<f64, ThresholdError> {
    if !score.is_finite() {
        return Err(ThresholdError::NonFiniteScore { score });
    }
    Ok(score + 0.0)
}

impl ScoreBuckets {
    /// Bucket a set of scored documents
    pub fn aggregate(documents: &[ScoredDocument<'_>]) -> Result<Self, ThresholdError> {
        Self::from_scores(documents, |d| d.score, |d| d.in_category)
    }

    /// Bucket arbitrary items given a scoring function and a membership predicate
    pub fn from_scores<T, S, P>(items: &[T], score: S, is_member: P) -> Result<Self, ThresholdError>
    where
        S: Fn(&T) -> f64,
        P: Fn(&T) -> bool,
    {
        let mut keyed = items
            .iter()
            .map(|item| -> Result<(f64, bool), ThresholdError> {
                Ok((score_key(score(item))?, is_member(item)))
            })
            .collect::<Result<Vec<_>, ThresholdError>>()?;

        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut buckets: Vec<ScoreBucket> = Vec::new();
        let mut cat_doc_count = 0;

        for (key, member) in keyed {
            let starts_bucket = buckets
                .last()
                .map_or(true, |last| last.score.to_bits() != key.to_bits());
            if starts_bucket {
                buckets.push(ScoreBucket {
                    score: key,
                    positive_count: 0,
                    negative_count: 0,
                });
            }

            if let Some(bucket) = buckets.last_mut() {
                if member {
                    bucket.positive_count += 1;
                    cat_doc_count += 1;
                } else {
                    bucket.negative_count += 1;
                }
            }
        }

        Ok(Self {
            buckets,
            cat_doc_count,
        })
    }

    /// Build from pre-counted `(score, positive_count, negative_count)` triples
    ///
    /// Rejects non-finite or duplicate scores, empty buckets, and a
    /// `cat_doc_count` that differs from the summed positive counts.
    pub fn from_counts<I>(cat_doc_count: usize, counts: I) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = (f64, usize, usize)>,
    {
        let mut buckets = counts
            .into_iter()
            .map(|(score, positive_count, negative_count)| -> Result<ScoreBucket, ThresholdError> {
                let score = score_key(score)?;
                if positive_count == 0 && negative_count == 0 {
                    return Err(ThresholdError::EmptyBucket { score });
                }
                Ok(ScoreBucket {
                    score,
                    positive_count,
                    negative_count,
                })
            })
            .collect::<Result<Vec<_>, ThresholdError>>()?;

        buckets.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(pair) = buckets
            .windows(2)
            .find(|w| w[0].score.to_bits() == w[1].score.to_bits())
        {
            return Err(ThresholdError::DuplicateScore {
                score: pair[0].score,
            });
        }

        let counted: usize = buckets.iter().map(|b| b.positive_count).sum();
        if counted != cat_doc_count {
            return Err(ThresholdError::CountMismatch {
                declared: cat_doc_count,
                counted,
            });
        }

        Ok(Self {
            buckets,
            cat_doc_count,
        })
    }

    /// Number of in-category documents
    pub fn cat_doc_count(&self) -> usize {
        self.cat_doc_count
    }

    /// Number of out-of-category documents
    pub fn negative_count(&self) -> usize {
        self.buckets.iter().map(|b| b.negative_count).sum()
    }

    /// Number of distinct scores
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn highest_score(&self) -> Option<f64> {
        self.buckets.first().map(|b| b.score)
    }

    /// Buckets from the highest score down
    pub fn iter(&self) -> std::slice::Iter<'_, ScoreBucket> {
        self.buckets.iter()
    }
}
