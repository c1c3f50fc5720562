//! Shuffle-side building blocks shared by the barrier nodes.
//!
//! - [`StableMap`]: the hash map used for every partition-local and merged
//!   grouping. It uses a fixed-key hasher, so the same rows inserted in the
//!   same order always iterate in the same order. Re-running a pipeline
//!   therefore reproduces its output row order exactly.
//! - [`split_rows`]: cuts merged rows into output partitions.
//! - [`SortedGroup`]: a lazy k-way merge over sorted runs. Secondary-sort
//!   consumers pull from it one element at a time, so a consumer that stops
//!   early never pays for the rest of the group.

use crate::type_token::Partition;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BinaryHeap, HashMap};
use std::hash::BuildHasherDefault;
use std::vec::IntoIter;

/// Deterministic-iteration hash map.
pub type StableMap<K, V> = HashMap<K, V, BuildHasherDefault<DefaultHasher>>;

/// Split `rows` into at most `n` contiguous partitions without cloning.
///
/// Always returns at least one partition, even for empty input.
pub(crate) fn split_rows<T: Send + Sync + 'static>(rows: Vec<T>, n: usize) -> Vec<Partition> {
    if n <= 1 || rows.len() <= 1 {
        return vec![Box::new(rows) as Partition];
    }
    let chunk = rows.len().div_ceil(n);
    let mut rest = rows;
    let mut out = Vec::with_capacity(n);
    while !rest.is_empty() {
        let start = ((rest.len() - 1) / chunk) * chunk;
        out.push(Box::new(rest.split_off(start)) as Partition);
    }
    out.reverse();
    out
}

/// Concatenate typed partitions back into one vector.
pub(crate) fn concat_parts<T: 'static>(parts: Vec<Partition>, what: &'static str) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for p in parts {
        let mut v = *p.downcast::<Vec<T>>().expect(what);
        out.append(&mut v);
    }
    out
}

/// Heap entry: the current head of one run.
struct Head<S, V> {
    key: S,
    run: usize,
    value: V,
}

impl<S: Ord, V> PartialEq for Head<S, V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S: Ord, V> Eq for Head<S, V> {}

impl<S: Ord, V> PartialOrd for Head<S, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so that `BinaryHeap` pops the smallest key first. Equal keys pop
// in run order, which keeps the merge stable.
impl<S: Ord, V> Ord for Head<S, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.run.cmp(&self.run))
    }
}

/// Lazy ascending k-way merge of `(S, V)` runs, each already sorted by `S`.
///
/// Holds one head per run; everything else stays in the runs until pulled.
pub struct SortedGroup<S, V> {
    runs: Vec<IntoIter<(S, V)>>,
    heap: BinaryHeap<Head<S, V>>,
}

impl<S: Ord, V> SortedGroup<S, V> {
    /// Build a merge over `runs`. Every run must be sorted ascending by `S`.
    #[must_use]
    pub fn new(runs: Vec<Vec<(S, V)>>) -> Self {
        let mut runs: Vec<IntoIter<(S, V)>> = runs.into_iter().map(Vec::into_iter).collect();
        let mut heap = BinaryHeap::with_capacity(runs.len());
        for (run, it) in runs.iter_mut().enumerate() {
            if let Some((key, value)) = it.next() {
                heap.push(Head { key, run, value });
            }
        }
        Self { runs, heap }
    }

    /// The next element without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<(&S, &V)> {
        self.heap.peek().map(|h| (&h.key, &h.value))
    }
}

impl<S: Ord, V> Iterator for SortedGroup<S, V> {
    type Item = (S, V);

    fn next(&mut self) -> Option<Self::Item> {
        let Head { key, run, value } = self.heap.pop()?;
        if let Some((k, v)) = self.runs[run].next() {
            self.heap.push(Head {
                key: k,
                run,
                value: v,
            });
        }
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.heap.len() + self.runs.iter().map(ExactSizeIterator::len).sum::<usize>();
        (n, Some(n))
    }
}

impl<S: Ord, V> ExactSizeIterator for SortedGroup<S, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_ascending_and_stable() {
        let runs = vec![
            vec![(1, "a0"), (3, "a1"), (3, "a2")],
            vec![(0, "b0"), (3, "b1")],
            vec![],
            vec![(2, "c0")],
        ];
        let merged: Vec<_> = SortedGroup::new(runs).collect();
        assert_eq!(
            merged,
            vec![(0, "b0"), (1, "a0"), (2, "c0"), (3, "a1"), (3, "a2"), (3, "b1")]
        );
    }

    #[test]
    fn peek_and_len_track_progress() {
        let mut g = SortedGroup::new(vec![vec![(5, 'x')], vec![(1, 'y'), (9, 'z')]]);
        assert_eq!(g.len(), 3);
        assert_eq!(g.peek(), Some((&1, &'y')));
        g.next();
        assert_eq!(g.len(), 2);
        assert_eq!(g.peek(), Some((&5, &'x')));
    }

    #[test]
    fn split_rows_is_contiguous() {
        let parts = split_rows((0..7).collect::<Vec<u8>>(), 3);
        assert_eq!(parts.len(), 3);
        let back: Vec<u8> = concat_parts(parts, "u8 parts");
        assert_eq!(back, (0..7).collect::<Vec<u8>>());

        let empty = split_rows(Vec::<u8>::new(), 4);
        assert_eq!(empty.len(), 1);
    }
}
