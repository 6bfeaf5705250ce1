//! Break-even point threshold search
//!
//! Scored documents are reduced into score buckets (`aggregate`), which
//! the walker (`walker`) scans from the highest score down to find the
//! cut where precision and recall are closest. Observers (`observer`)
//! can watch the walk without affecting it.

mod aggregate;
mod observer;
mod walker;

#[cfg(test)]
mod tests;

pub use aggregate::{ScoreBucket, ScoreBuckets, ScoredDocument};
pub use observer::{
    BucketMembers, NoopObserver, TraceEvent, TracingObserver, VerboseObserver, WalkObserver,
};
pub use walker::{find_break_even, BepWalker, CrossoverChoice, ThresholdEstimate, WalkOutcome};
