//! Property-based tests for folding and top-hit maintenance.
//!
//! These invariants must hold for any light curve and any sequence of
//! candidates, not just the hand-picked cases in the unit tests.

use period_search::{
    fold_with_epoch, insert_ranked, score_scatter, Observation, Ranking, ScanResult,
    ScatterOptions, ScatterScore, TopHits,
};
use proptest::prelude::*;

/// Strategy for unsorted light curves with widely spread times.
fn observations_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec((-1.0e6..1.0e6_f64, 5.0..15.0_f64), min_len..max_len).prop_map(
        |points| {
            points
                .into_iter()
                .map(|(time, magnitude)| Observation::new(time, magnitude, 0.01))
                .collect()
        },
    )
}

/// Strategy for candidate (period, scatter) pairs.
fn candidates_strategy(max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.1..100.0_f64, 0.0..10.0_f64), 0..max_len)
}

fn scatter_result(period: f64, scatter: f64) -> ScanResult {
    ScanResult::new(
        period,
        ScatterScore {
            scatter,
            segment_sum: scatter,
        },
    )
}

// =============================================================================
// Property: folding
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn phases_lie_in_unit_interval(
        observations in observations_strategy(1, 200),
        period in 0.001..1000.0_f64,
        epoch in -1.0e3..1.0e3_f64,
    ) {
        let folded = fold_with_epoch(&observations, period, epoch).unwrap();
        prop_assert_eq!(folded.len(), observations.len());
        for point in &folded {
            prop_assert!(point.phase >= 0.0 && point.phase < 1.0, "phase {}", point.phase);
        }
    }

    #[test]
    fn folded_points_sorted_and_complete(
        observations in observations_strategy(1, 200),
        period in 0.001..1000.0_f64,
    ) {
        let folded = fold_with_epoch(&observations, period, 0.0).unwrap();
        prop_assert!(folded.windows(2).all(|w| w[0].phase <= w[1].phase));

        let mut indices: Vec<usize> = folded.iter().map(|p| p.original_index).collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..observations.len()).collect::<Vec<_>>());

        for point in &folded {
            prop_assert_eq!(point.magnitude, observations[point.original_index].magnitude);
        }
    }

    #[test]
    fn scatter_non_negative_and_wraparound_adds(
        observations in observations_strategy(2, 100),
        period in 0.01..100.0_f64,
    ) {
        let folded = fold_with_epoch(&observations, period, 0.0).unwrap();
        let open = score_scatter(&folded, ScatterOptions { wraparound: false }).unwrap();
        let closed = score_scatter(&folded, ScatterOptions { wraparound: true }).unwrap();
        prop_assert!(open.scatter >= 0.0);
        prop_assert!(closed.scatter >= open.scatter);
        prop_assert!(open.segment_sum >= open.scatter);
    }
}

// =============================================================================
// Property: top hits
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn insert_ranked_keeps_best_prefix(
        values in prop::collection::vec(any::<i32>(), 0..100),
        max_size in 1usize..30,
    ) {
        let mut list = Vec::new();
        for &value in &values {
            insert_ranked(&mut list, value, max_size, |a: &i32, b: &i32| a.cmp(b));
            prop_assert!(list.len() <= max_size);
        }

        let mut expected = values.clone();
        expected.sort();
        expected.truncate(max_size);
        prop_assert_eq!(list, expected);
    }

    #[test]
    fn top_hits_bounded_and_ordered(
        candidates in candidates_strategy(100),
        capacity in 1usize..25,
    ) {
        let mut hits = TopHits::new(Ranking::LowestScatter, capacity);
        for &(period, scatter) in &candidates {
            hits.insert(scatter_result(period, scatter));
        }

        prop_assert_eq!(hits.len(), candidates.len().min(capacity));
        prop_assert!(hits
            .entries()
            .windows(2)
            .all(|w| w[0].scatter() <= w[1].scatter()));
        if let Some(best) = hits.best() {
            let lowest = candidates
                .iter()
                .map(|&(_, scatter)| scatter)
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(best.scatter(), lowest);
        }
    }

    #[test]
    fn top_hits_independent_of_arrival_order(
        (candidates, shuffled) in candidates_strategy(60)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        capacity in 1usize..20,
    ) {
        let mut in_order = TopHits::new(Ranking::LowestScatter, capacity);
        let mut reordered = TopHits::new(Ranking::LowestScatter, capacity);
        for &(period, scatter) in &candidates {
            in_order.insert(scatter_result(period, scatter));
        }
        for &(period, scatter) in &shuffled {
            reordered.insert(scatter_result(period, scatter));
        }
        prop_assert_eq!(in_order, reordered);
    }
}
