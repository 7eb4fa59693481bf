//! Bounded top-K ranking of scored candidates.
//!
//! [`TopK`] keeps the `k` best entries seen so far in a min-heap of [`Reverse`]-wrapped
//! entries, so the current worst survivor sits at the top and is cheap to evict.
//!
//! Ordering is total and deterministic: scores compare with [`f64::total_cmp`], a NaN
//! score ranks below every number, and equal scores prefer the lower candidate index. Because of that, merging per-worker rankings
//! in any order yields the same final ranking.
//!
//! ```
//! use cueai_evaluator::ranking::TopK;
//!
//! let mut top = TopK::new(2);
//! top.push(1.0, 0, "weak");
//! top.push(5.0, 1, "strong");
//! top.push(3.0, 2, "middle");
//!
//! let ranked: Vec<_> = top.into_sorted_vec().into_iter().map(|r| r.item).collect();
//! assert_eq!(ranked, ["strong", "middle"]);
//! ```

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

/// An item with its score and the index of the candidate it came from.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub score: f64,
    pub index: usize,
    pub item: T,
}

impl<T> Ranked<T> {
    /// Ordering where `Greater` means "ranks higher".
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .is_nan()
            .cmp(&self.score.is_nan())
            .then_with(|| self.score.total_cmp(&other.score))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other).is_eq()
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Keeps the `capacity` highest-ranked entries pushed into it.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked<T>>>,
}

impl<T> TopK<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers an entry; it is kept only if it ranks among the best `capacity`.
    pub fn push(&mut self, score: f64, index: usize, item: T) {
        self.insert(Ranked { score, index, item });
    }

    /// Offers an already ranked entry.
    pub fn insert(&mut self, entry: Ranked<T>) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return;
        }
        if let Some(mut worst) = self.heap.peek_mut()
            && entry > worst.0
        {
            *worst = Reverse(entry);
        }
    }

    /// Combines two rankings, keeping the best `max(capacity)` entries of both.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.capacity = self.capacity.max(other.capacity);
        for Reverse(entry) in other.heap {
            self.insert(entry);
        }
        self
    }

    /// The highest-ranked entry.
    #[must_use]
    pub fn best(&self) -> Option<&Ranked<T>> {
        self.heap.iter().map(|Reverse(entry)| entry).max()
    }

    /// Entries ordered best first.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<Ranked<T>> {
        // ascending order of Reverse is descending rank
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(top: TopK<&'static str>) -> Vec<&'static str> {
        top.into_sorted_vec().into_iter().map(|r| r.item).collect()
    }

    #[test]
    fn test_keeps_only_best_k() {
        let mut top = TopK::new(3);
        for (i, score) in [4.0, -1.0, 9.0, 2.5, 7.0, 0.0].into_iter().enumerate() {
            top.push(score, i, score);
        }
        let scores: Vec<f64> = top.into_sorted_vec().into_iter().map(|r| r.item).collect();
        assert_eq!(scores, [9.0, 7.0, 4.0]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let mut top = TopK::new(2);
        top.push(1.0, 5, "late");
        top.push(1.0, 2, "early");
        top.push(1.0, 9, "latest");
        assert_eq!(top.best().unwrap().item, "early");
        assert_eq!(items(top), ["early", "late"]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let entries = [(3.0, 0, "a"), (8.0, 1, "b"), (8.0, 2, "c"), (1.0, 3, "d"), (5.0, 4, "e")];
        let build = |range: &[(f64, usize, &'static str)]| {
            let mut top = TopK::new(3);
            for &(score, index, item) in range {
                top.push(score, index, item);
            }
            top
        };
        let left = build(&entries[..2]).merge(build(&entries[2..]));
        let right = build(&entries[2..]).merge(build(&entries[..2]));
        assert_eq!(items(left), ["b", "c", "e"]);
        assert_eq!(items(right), ["b", "c", "e"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut top = TopK::new(0);
        top.push(1.0, 0, "x");
        assert!(top.is_empty());
        assert!(top.best().is_none());
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let mut top = TopK::new(2);
        top.push(f64::NAN, 0, "nan");
        top.push(1.0, 1, "one");
        top.push(2.0, 2, "two");
        assert_eq!(top.best().unwrap().item, "two");
        assert_eq!(items(top), ["two", "one"]);

        let mut top = TopK::new(3);
        top.push(-f64::NAN, 0, "negative nan");
        top.push(f64::NEG_INFINITY, 1, "neg inf");
        top.push(f64::NAN, 2, "nan");
        let ranked = items(top);
        assert_eq!(ranked[0], "neg inf");
        assert_eq!(ranked.len(), 3);
    }
}
