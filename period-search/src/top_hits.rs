//! Bounded, ordered list of the best candidate periods.
//!
//! Entries are kept best first. Once the list is full a candidate is only
//! admitted if it beats the current worst entry, which is then dropped.
//! Because equal scores are broken by period, the final contents depend
//! only on the set of candidates offered, not on the order they arrive in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::result::ScanResult;

/// Default capacity of a top-hit list.
pub const MAX_TOP_HITS: usize = 20;

/// Insert `candidate` into a best-first `list` of at most `max_size` entries.
///
/// `cmp(a, b)` returns `Ordering::Less` when `a` is better than `b`. A
/// candidate equal to existing entries goes after them. Returns whether
/// the candidate was kept.
pub fn insert_ranked<T, F>(list: &mut Vec<T>, candidate: T, max_size: usize, mut cmp: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    if max_size == 0 {
        return false;
    }

    if list.len() >= max_size {
        let worst = &list[list.len() - 1];
        if cmp(&candidate, worst) != Ordering::Less {
            return false;
        }
        list.truncate(max_size - 1);
    }

    let index = list.partition_point(|entry| cmp(entry, &candidate) != Ordering::Greater);
    list.insert(index, candidate);
    true
}

/// Which statistic decides that one period beats another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ranking {
    LowestScatter,
    LowestSegmentSum,
    /// Results without an F value rank below all that have one
    HighestFValue,
}

impl Ranking {
    /// `Ordering::Less` when `a` is the better candidate.
    ///
    /// Equal scores fall back to the smaller period.
    pub fn compare(&self, a: &ScanResult, b: &ScanResult) -> Ordering {
        let primary = match self {
            Ranking::LowestScatter => a.scatter().total_cmp(&b.scatter()),
            Ranking::LowestSegmentSum => a.segment_sum().total_cmp(&b.segment_sum()),
            Ranking::HighestFValue => match (a.f_value(), b.f_value()) {
                (Some(fa), Some(fb)) => fb.total_cmp(&fa),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.period().total_cmp(&b.period()))
    }
}

/// The best `capacity` scan results under a [`Ranking`], best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopHits {
    ranking: Ranking,
    capacity: usize,
    entries: Vec<ScanResult>,
}

impl TopHits {
    pub fn new(ranking: Ranking, capacity: usize) -> Self {
        Self {
            ranking,
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Offer a candidate; returns whether it made the list.
    pub fn insert(&mut self, candidate: ScanResult) -> bool {
        let ranking = self.ranking;
        insert_ranked(&mut self.entries, candidate, self.capacity, |a, b| {
            ranking.compare(a, b)
        })
    }

    pub fn best(&self) -> Option<&ScanResult> {
        self.entries.first()
    }

    pub fn worst(&self) -> Option<&ScanResult> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[ScanResult] {
        &self.entries
    }

    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{AnovaScore, ScatterScore};

    fn scatter_result(period: f64, scatter: f64) -> ScanResult {
        ScanResult::new(
            period,
            ScatterScore {
                scatter,
                segment_sum: scatter * 2.0,
            },
        )
    }

    fn f_result(period: f64, f_value: f64) -> ScanResult {
        scatter_result(period, 1.0).with_anova(AnovaScore {
            f_value,
            p_value: 0.5,
            df_between: 9,
            df_within: 40,
            populated_bins: 10,
        })
    }

    #[test]
    fn test_insert_ranked_keeps_smallest() {
        let mut list = Vec::new();
        for value in [5, 3, 8, 1, 9, 2, 7] {
            insert_ranked(&mut list, value, 3, |a: &i32, b: &i32| a.cmp(b));
            assert!(list.len() <= 3);
        }
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_ranked_rejects_when_not_strictly_better() {
        let mut list = vec![1, 2, 3];
        assert!(!insert_ranked(&mut list, 3, 3, |a: &i32, b: &i32| a.cmp(b)));
        assert!(!insert_ranked(&mut list, 4, 3, |a: &i32, b: &i32| a.cmp(b)));
        assert!(insert_ranked(&mut list, 0, 3, |a: &i32, b: &i32| a.cmp(b)));
        assert_eq!(list, vec![0, 1, 2]);
    }

    #[test]
    fn test_insert_ranked_zero_capacity() {
        let mut list: Vec<i32> = Vec::new();
        assert!(!insert_ranked(&mut list, 1, 0, |a, b| a.cmp(b)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_lowest_scatter_best_first() {
        let mut hits = TopHits::new(Ranking::LowestScatter, 3);
        hits.insert(scatter_result(1.0, 4.0));
        hits.insert(scatter_result(2.0, 1.0));
        hits.insert(scatter_result(3.0, 3.0));
        hits.insert(scatter_result(4.0, 2.0));

        let periods: Vec<f64> = hits.entries().iter().map(|r| r.period()).collect();
        assert_eq!(periods, vec![2.0, 4.0, 3.0]);
        assert_eq!(hits.best().map(|r| r.period()), Some(2.0));
        assert!(hits.is_full());
    }

    #[test]
    fn test_equal_scores_prefer_smaller_period() {
        let mut hits = TopHits::new(Ranking::LowestScatter, 2);
        hits.insert(scatter_result(5.0, 1.0));
        hits.insert(scatter_result(3.0, 1.0));
        hits.insert(scatter_result(4.0, 1.0));

        let periods: Vec<f64> = hits.entries().iter().map(|r| r.period()).collect();
        assert_eq!(periods, vec![3.0, 4.0]);
    }

    #[test]
    fn test_highest_f_value() {
        let mut hits = TopHits::new(Ranking::HighestFValue, 2);
        hits.insert(f_result(1.0, 2.0));
        hits.insert(scatter_result(1.5, 0.1));
        hits.insert(f_result(2.0, 9.0));
        hits.insert(f_result(3.0, 5.0));

        let periods: Vec<f64> = hits.entries().iter().map(|r| r.period()).collect();
        assert_eq!(periods, vec![2.0, 3.0]);
    }

    #[test]
    fn test_lowest_segment_sum() {
        let a = scatter_result(1.0, 3.0);
        let b = scatter_result(2.0, 1.0);
        assert_eq!(Ranking::LowestSegmentSum.compare(&b, &a), Ordering::Less);
        assert_eq!(Ranking::LowestSegmentSum.compare(&a, &a), Ordering::Equal);
    }
}
