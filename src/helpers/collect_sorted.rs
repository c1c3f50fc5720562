//! Collect-then-sort helpers, mostly for tests and deterministic sinks.
//!
//! - [`PCollection::collect_seq_sorted`]: sequential run, full sort
//! - [`PCollection::collect_par_sorted`]: parallel run, full sort
//! - [`PCollection::collect_par_sorted_by_key`]: parallel run, sorted by key only

use crate::{PCollection, RFBound};
use anyhow::Result;

impl<T: RFBound + Ord> PCollection<T> {
    /// Collect sequentially and sort.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PCollection::collect_seq`].
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let sorted = from_vec(&p, vec![3, 1, 2]).collect_seq_sorted().unwrap();
    /// assert_eq!(sorted, vec![1, 2, 3]);
    /// ```
    pub fn collect_seq_sorted(self) -> Result<Vec<T>> {
        let mut v = self.collect_seq()?;
        v.sort();
        Ok(v)
    }

    /// Collect in parallel and sort.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PCollection::collect_par`].
    pub fn collect_par_sorted(
        self,
        threads: Option<usize>,
        partitions: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut v = self.collect_par(threads, partitions)?;
        v.sort();
        Ok(v)
    }
}

impl<K: RFBound + Ord, V: RFBound> PCollection<(K, V)> {
    /// Collect in parallel and stable-sort by key; values are not compared.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PCollection::collect_par`].
    pub fn collect_par_sorted_by_key(
        self,
        threads: Option<usize>,
        partitions: Option<usize>,
    ) -> Result<Vec<(K, V)>> {
        let mut v = self.collect_par(threads, partitions)?;
        v.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(v)
    }
}
