//! Frequency rankings.

use crate::{PCollection, RFBound};
use std::cmp::Reverse;
use std::hash::Hash;
use tracing::debug;

impl<X, Y> PCollection<(X, Y)>
where
    X: RFBound + Eq + Hash,
    Y: RFBound + Eq + Hash,
{
    /// The `n` most frequent `Y`s of every `X`, as `(count, y)` by descending count.
    ///
    /// Rows are counted per `(X, Y)` pair, re-keyed by `X` with the negated
    /// count as secondary key, and each sorted group is cut after `n` items.
    /// Every `X` gets a row, with an empty list when `n == 0`. Equal counts
    /// keep a deterministic but unspecified order.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let t = from_vec(&p, "xxxyyz".chars().map(|c| ('a', c)).collect::<Vec<_>>());
    /// let top = t.top_n_by_key(2).collect_seq().unwrap();
    /// assert_eq!(top, vec![('a', vec![(3, 'x'), (2, 'y')])]);
    /// ```
    pub fn top_n_by_key(self, n: usize) -> PCollection<(X, Vec<(u64, Y)>)> {
        debug!(n, "planning per-key top list");
        self.count_per_element()
            .negate_counts()
            .map(|((x, y), neg): &((X, Y), i64)| (x.clone(), (*neg, y.clone())))
            .sort_and_apply(move |_x: &X, group| {
                group
                    .take(n)
                    .map(|(neg, y): (i64, Y)| (neg.unsigned_abs(), y))
                    .collect::<Vec<_>>()
            })
    }
}

impl<T: RFBound + Eq + Hash> PCollection<T> {
    /// Every distinct element with its count, by descending count.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let out = from_vec(&p, "aaabbcccc".chars().collect::<Vec<_>>())
    ///     .global_toplist()
    ///     .collect_par(None, Some(4))
    ///     .unwrap();
    /// assert_eq!(out, vec![('c', 4), ('a', 3), ('b', 2)]);
    /// ```
    pub fn global_toplist(self) -> PCollection<(T, u64)> {
        self.count_per_element()
            .sort_globally_by_key(|(_, c): &(T, u64)| Reverse(*c))
    }
}
