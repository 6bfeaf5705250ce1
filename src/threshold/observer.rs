//! Walk observers
//!
//! Hooks for tracing the descending walk over score buckets. The walker
//! calls these in order: `on_start`, `on_bucket` for each bucket visited,
//! `on_crossover` when the walk stops inside a bucket, then `on_finish`.

use super::aggregate::{score_key, ScoreBucket, ScoreBuckets, ScoredDocument};
use super::walker::{CrossoverChoice, ThresholdEstimate};
use std::collections::HashMap;

pub trait WalkObserver {
    fn on_start(&mut self, _buckets: &ScoreBuckets) {}

    /// Called with the tentative state after applying `bucket`
    fn on_bucket(&mut self, _bucket: &ScoreBucket, _next_b: usize, _next_c: usize) {}

    /// `previous_diff` is `None` when the crossover happens in the first bucket
    fn on_crossover(
        &mut self,
        _previous_diff: Option<f64>,
        _current_diff: f64,
        _choice: CrossoverChoice,
    ) {
    }

    fn on_finish(&mut self, _estimate: &ThresholdEstimate) {}
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// Emits `tracing` debug events for every step
#[derive(Debug, Clone)]
pub struct TracingObserver<'a> {
    category: &'a str,
}

impl<'a> TracingObserver<'a> {
    pub fn new(category: &'a str) -> Self {
        Self { category }
    }
}

impl WalkObserver for TracingObserver<'_> {
    fn on_start(&mut self, buckets: &ScoreBuckets) {
        tracing::debug!(
            category = self.category,
            buckets = buckets.len(),
            in_category = buckets.cat_doc_count(),
            out_of_category = buckets.negative_count(),
            "starting threshold walk"
        );
    }

    fn on_bucket(&mut self, bucket: &ScoreBucket, next_b: usize, next_c: usize) {
        tracing::debug!(
            category = self.category,
            score = bucket.score,
            positive = bucket.positive_count,
            negative = bucket.negative_count,
            b = next_b,
            c = next_c,
            "bucket"
        );
    }

    fn on_crossover(
        &mut self,
        previous_diff: Option<f64>,
        current_diff: f64,
        choice: CrossoverChoice,
    ) {
        tracing::debug!(
            category = self.category,
            ?previous_diff,
            current_diff,
            ?choice,
            "crossover"
        );
    }

    fn on_finish(&mut self, estimate: &ThresholdEstimate) {
        tracing::debug!(
            category = self.category,
            threshold = estimate.threshold,
            bep = estimate.bep,
            a = estimate.true_positives,
            b = estimate.false_positives,
            c = estimate.false_negatives,
            "threshold estimated"
        );
    }
}

/// Names of the documents sitting in each bucket
#[derive(Debug, Default, Clone)]
pub struct BucketMembers<'a> {
    by_score: HashMap<u64, (Vec<&'a str>, Vec<&'a str>)>,
}

impl<'a> BucketMembers<'a> {
    /// Index named documents by bucket key; unnamed or non-finite entries are skipped
    pub fn collect(documents: &[ScoredDocument<'a>]) -> Self {
        let mut by_score: HashMap<u64, (Vec<&'a str>, Vec<&'a str>)> = HashMap::new();
        for doc in documents {
            let (Some(name), Ok(key)) = (doc.name, score_key(doc.score)) else {
                continue;
            };
            let entry = by_score.entry(key.to_bits()).or_default();
            if doc.in_category {
                entry.0.push(name);
            } else {
                entry.1.push(name);
            }
        }
        Self { by_score }
    }

    /// In-category and out-of-category names at `score`
    pub fn get(&self, score: f64) -> (&[&'a str], &[&'a str]) {
        const NONE: &[&str] = &[];
        match self.by_score.get(&score.to_bits()) {
            Some((inside, outside)) => (inside.as_slice(), outside.as_slice()),
            None => (NONE, NONE),
        }
    }
}

/// One recorded step of a walk
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Start {
        buckets: usize,
        in_category: usize,
        out_of_category: usize,
    },
    Bucket {
        score: f64,
        positive_count: usize,
        negative_count: usize,
        b: usize,
        c: usize,
        in_category: Vec<String>,
        out_of_category: Vec<String>,
    },
    Crossover {
        previous_diff: Option<f64>,
        current_diff: f64,
        choice: CrossoverChoice,
    },
    Finish {
        threshold: f64,
        bep: f64,
    },
}

/// Records every step along with the member document names
#[derive(Debug, Default)]
pub struct VerboseObserver<'a> {
    members: BucketMembers<'a>,
    events: Vec<TraceEvent>,
}

impl<'a> VerboseObserver<'a> {
    pub fn new(members: BucketMembers<'a>) -> Self {
        Self {
            members,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl WalkObserver for VerboseObserver<'_> {
    fn on_start(&mut self, buckets: &ScoreBuckets) {
        self.events.push(TraceEvent::Start {
            buckets: buckets.len(),
            in_category: buckets.cat_doc_count(),
            out_of_category: buckets.negative_count(),
        });
    }

    fn on_bucket(&mut self, bucket: &ScoreBucket, next_b: usize, next_c: usize) {
        let (inside, outside) = self.members.get(bucket.score);
        self.events.push(TraceEvent::Bucket {
            score: bucket.score,
            positive_count: bucket.positive_count,
            negative_count: bucket.negative_count,
            b: next_b,
            c: next_c,
            in_category: inside.iter().map(|s| s.to_string()).collect(),
            out_of_category: outside.iter().map(|s| s.to_string()).collect(),
        });
    }

    fn on_crossover(
        &mut self,
        previous_diff: Option<f64>,
        current_diff: f64,
        choice: CrossoverChoice,
    ) {
        self.events.push(TraceEvent::Crossover {
            previous_diff,
            current_diff,
            choice,
        });
    }

    fn on_finish(&mut self, estimate: &ThresholdEstimate) {
        self.events.push(TraceEvent::Finish {
            threshold: estimate.threshold,
            bep: estimate.bep,
        });
    }
}
