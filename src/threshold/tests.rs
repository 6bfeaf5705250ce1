use super::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

const DELTA: f64 = 1e-9;

fn estimate_docs(docs: &[ScoredDocument<'_>]) -> ThresholdEstimate {
    let buckets = ScoreBuckets::aggregate(docs).unwrap();
    find_break_even(&buckets).unwrap()
}

/// 1101001: splits into 1101 | 001 with b = c = 1, a = 3
fn interleaved_docs() -> Vec<ScoredDocument<'static>> {
    vec![
        ScoredDocument::named("d1", 7.3, true),
        ScoredDocument::named("d2", 7.1, true),
        ScoredDocument::named("d3", 6.7, false),
        ScoredDocument::named("d4", 5.4, true),
        ScoredDocument::named("d5", 5.1, false),
        ScoredDocument::named("d6", 4.9, false),
        ScoredDocument::named("d7", 4.7, true),
    ]
}

fn duplicated_buckets() -> ScoreBuckets {
    ScoreBuckets::from_counts(
        13,
        [
            (9.3, 2, 0),
            (8.9, 2, 2),
            (8.5, 0, 1),
            (8.1, 1, 3),
            (4.5, 1, 0),
            (3.4, 2, 2),
            (3.1, 1, 1),
            (2.1, 1, 0),
            (1.9, 2, 2),
            (1.3, 1, 1),
        ],
    )
    .unwrap()
}

#[test]
fn test_no_documents() {
    let est = estimate_docs(&[]);
    assert_eq!(est.threshold, 0.0);
    assert_eq!(est.bep, 1.0);
}

#[test]
fn test_empty_category() {
    let docs = [
        ScoredDocument::new(7.3, false),
        ScoredDocument::new(2.0, false),
    ];
    let est = estimate_docs(&docs);
    assert!((est.threshold - 1.5 * 7.3).abs() < DELTA);
    assert_eq!(est.bep, 1.0);
}

#[test]
fn test_single_document() {
    let est = estimate_docs(&[ScoredDocument::new(7.3, true)]);
    assert!((est.threshold - 7.3).abs() < DELTA);
    assert!((est.bep - 1.0).abs() < DELTA);
}

#[test]
fn test_interleaved_break_even() {
    let est = estimate_docs(&interleaved_docs());
    assert!((est.threshold - 5.4).abs() < DELTA);
    assert!((est.bep - 0.75).abs() < DELTA);
    assert_eq!(est.outcome, WalkOutcome::BreakEven);
    assert_eq!(
        (est.true_positives, est.false_positives, est.false_negatives),
        (3, 1, 1)
    );
}

#[test]
fn test_duplicated_scores_fall_back_to_previous_bucket() {
    let est = find_break_even(&duplicated_buckets()).unwrap();
    assert!((est.threshold - 4.5).abs() < DELTA);
    assert!((est.bep - 0.5 * (6.0 / 12.0 + 6.0 / 13.0)).abs() < DELTA);
    assert_eq!(
        est.outcome,
        WalkOutcome::Crossover {
            choice: CrossoverChoice::Previous
        }
    );
}

#[test]
fn test_estimation_is_deterministic() {
    let buckets = duplicated_buckets();
    let first = find_break_even(&buckets).unwrap();
    let second = find_break_even(&buckets).unwrap();
    assert_eq!(first, second);

    let docs = interleaved_docs();
    assert_eq!(estimate_docs(&docs), estimate_docs(&docs));
}

#[test]
fn test_near_equal_scores_do_not_merge() {
    // Merged into one bucket these would cross over at 0.75; kept apart,
    // the member sits alone above the non-member and breaks even.
    let docs = [
        ScoredDocument::new(0.1 + 0.2, true),
        ScoredDocument::new(0.3, false),
    ];
    let buckets = ScoreBuckets::aggregate(&docs).unwrap();
    assert_eq!(buckets.len(), 2);

    let est = find_break_even(&buckets).unwrap();
    assert_eq!(est.threshold, 0.1 + 0.2);
    assert_eq!(est.bep, 1.0);
}

#[test]
fn test_verbose_observer_records_walk() {
    let docs = interleaved_docs();
    let buckets = ScoreBuckets::aggregate(&docs).unwrap();
    let mut observer = VerboseObserver::new(BucketMembers::collect(&docs));

    let est = BepWalker::default()
        .estimate_observed(&buckets, &mut observer)
        .unwrap();

    let events = observer.into_events();
    assert_eq!(
        events.first(),
        Some(&TraceEvent::Start {
            buckets: 7,
            in_category: 4,
            out_of_category: 3,
        })
    );
    // Walk stops at 5.4, the fourth bucket
    let visited: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            TraceEvent::Bucket {
                score, in_category, ..
            } => Some((*score, in_category.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(visited.len(), 4);
    assert_eq!(visited[3], (5.4, vec!["d4".to_string()]));
    assert_eq!(
        events.last(),
        Some(&TraceEvent::Finish {
            threshold: est.threshold,
            bep: est.bep,
        })
    );
}

#[test]
fn test_crossover_event_reported() {
    let mut observer = VerboseObserver::default();
    BepWalker::default()
        .estimate_observed(&duplicated_buckets(), &mut observer)
        .unwrap();

    let crossover = observer
        .events()
        .iter()
        .find_map(|e| match e {
            TraceEvent::Crossover {
                previous_diff,
                current_diff,
                choice,
            } => Some((*previous_diff, *current_diff, *choice)),
            _ => None,
        })
        .unwrap();

    let (previous_diff, current_diff, choice) = crossover;
    assert!((previous_diff.unwrap() - (6.0 / 12.0 - 6.0 / 13.0)).abs() < DELTA);
    assert!((current_diff - (8.0 / 13.0 - 8.0 / 16.0)).abs() < DELTA);
    assert_eq!(choice, CrossoverChoice::Previous);
}

/// Distinct scores starting at 1.0, plus `extra` in-category documents at 0.5
fn build_buckets(ids: &BTreeSet<u32>, counts: &[(usize, usize)], extra: usize) -> ScoreBuckets {
    let mut triples: Vec<(f64, usize, usize)> = ids
        .iter()
        .zip(counts.iter().cycle())
        .map(|(&id, &(pos, neg))| {
            let (pos, neg) = if pos + neg == 0 { (0, 1) } else { (pos, neg) };
            (1.0 + id as f64 / 10.0, pos, neg)
        })
        .collect();
    if extra > 0 {
        triples.push((0.5, extra, 0));
    }
    let total = triples.iter().map(|t| t.1).sum();
    ScoreBuckets::from_counts(total, triples).unwrap()
}

proptest! {
    #[test]
    fn prop_low_scoring_members_never_raise_threshold(
        ids in prop::collection::btree_set(0u32..500, 1..20),
        counts in prop::collection::vec((0usize..4, 0usize..4), 1..20),
        extra in 1usize..6
    ) {
        let before = find_break_even(&build_buckets(&ids, &counts, 0)).unwrap();
        let after = find_break_even(&build_buckets(&ids, &counts, extra)).unwrap();
        prop_assert!(
            after.threshold <= before.threshold + DELTA,
            "threshold rose from {} to {}",
            before.threshold,
            after.threshold
        );
    }

    #[test]
    fn prop_estimate_lands_on_a_bucket(
        ids in prop::collection::btree_set(0u32..500, 1..20),
        counts in prop::collection::vec((0usize..4, 0usize..4), 1..20),
        extra in 0usize..3
    ) {
        let buckets = build_buckets(&ids, &counts, extra);
        let est = find_break_even(&buckets).unwrap();

        prop_assert!((0.0..=1.0).contains(&est.bep));
        prop_assert_eq!(
            est.true_positives + est.false_negatives,
            buckets.cat_doc_count()
        );
        if buckets.cat_doc_count() > 0 {
            prop_assert!(buckets.iter().any(|b| b.score == est.threshold));
        }
    }
}
