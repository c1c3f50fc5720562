//! Nearest-rank percentiles per key, two ways.
//!
//! **Distributed.** No group is ever buffered whole:
//! 1. count every key (`keys().count_per_element()`),
//! 2. join the counts back onto the rows, giving `(K, (count, V))`,
//! 3. swap to `(K, (V, count))` so the value becomes the secondary sort key,
//! 4. `sort_and_apply`: read the count off the head of the sorted group, then
//!    stream it once through [`select_by_rank`].
//!
//! **In memory.** `group_by_key`, sort each group's `Vec<V>`, then the same
//! [`select_by_rank`]. Cheaper for small groups.
//!
//! Both share the rank function, so they agree on every input.

use super::quantiles::{PercentileResult, QuantileSet, select_by_rank};
use crate::error::PlanError;
use crate::node::DynOp;
use crate::shuffle::SortedGroup;
use crate::{PCollection, Partition, RFBound};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Sorts each grouped `Vec<V>` in place and selects its ranks.
struct SelectRanksOp<K, V> {
    quantiles: QuantileSet,
    _t: PhantomData<(K, V)>,
}

impl<K, V> DynOp for SelectRanksOp<K, V>
where
    K: RFBound,
    V: RFBound + Ord,
{
    fn apply(&self, input: Partition) -> Partition {
        let groups = *input
            .downcast::<Vec<(K, Vec<V>)>>()
            .expect("select ranks: expected Vec<(K, Vec<V>)>");
        let out: Vec<(K, PercentileResult<V>)> = groups
            .into_iter()
            .map(|(k, mut vs)| {
                vs.sort();
                let n = vs.len() as u64;
                (k, select_by_rank(vs, n, &self.quantiles))
            })
            .collect();
        Box::new(out) as Partition
    }

    fn name(&self) -> &'static str {
        "select_ranks"
    }

    fn cost_hint(&self) -> u8 {
        20
    }
}

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Eq + Hash,
    V: RFBound + Ord,
{
    /// Percentiles of every key via count, join and secondary sort.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let t = from_vec(&p, (1..=5u32).map(|v| ("a".to_string(), v)).collect::<Vec<_>>());
    /// let out = t.percentiles_distributed(&[0.0, 0.5, 1.0]).unwrap().collect_seq().unwrap();
    /// assert_eq!(out[0].1.count, 5);
    /// assert_eq!(out[0].1.percentiles, vec![(0.0, 1), (0.5, 3), (1.0, 5)]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] if `quantiles` is empty or holds a value
    /// outside `[0, 1]`. Nothing is added to the pipeline in that case.
    pub fn percentiles_distributed(
        self,
        quantiles: &[f64],
    ) -> Result<PCollection<(K, PercentileResult<V>)>, PlanError> {
        let qs = Arc::new(QuantileSet::new(quantiles.to_vec())?);
        debug!(quantiles = ?qs.as_slice(), "planning distributed percentiles");

        let counts = self.clone().keys().count_per_element();
        Ok(counts
            .join_inner(&self)
            .map_values(|(n, v): &(u64, V)| (v.clone(), *n))
            .sort_and_apply(move |_k: &K, group: SortedGroup<V, u64>| {
                let count = group.peek().map_or(0, |(_, n)| *n);
                select_by_rank(group.map(|(v, _)| v), count, &qs)
            }))
    }

    /// Percentiles of every key by sorting each whole group in memory.
    ///
    /// Groups are sorted where the shuffle left them, without a copy.
    ///
    /// # Errors
    ///
    /// Same validation as [`percentiles_distributed`](Self::percentiles_distributed).
    pub fn percentiles_in_memory(
        self,
        quantiles: &[f64],
    ) -> Result<PCollection<(K, PercentileResult<V>)>, PlanError> {
        let quantiles = QuantileSet::new(quantiles.to_vec())?;
        debug!(quantiles = ?quantiles.as_slice(), "planning in-memory percentiles");

        let op: Arc<dyn DynOp> = Arc::new(SelectRanksOp::<K, V> {
            quantiles,
            _t: PhantomData,
        });
        Ok(self.group_by_key().then_op(op))
    }
}
