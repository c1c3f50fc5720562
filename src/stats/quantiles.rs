//! Quantile requests, nearest-rank selection and percentile results.
//!
//! Rank of quantile `q` over `n` sorted values (zero-based):
//!
//! ```text
//! idx(q) = clamp(ceil(q * n) - 1, 0, n - 1)
//! ```
//!
//! `q * n` is evaluated in `f64`. Several quantiles may land on the same index;
//! each of them is reported with the value at that index.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated, non-empty list of quantiles in `[0, 1]`.
///
/// Duplicates are allowed and request order is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantileSet {
    quantiles: Vec<f64>,
}

impl QuantileSet {
    /// # Errors
    ///
    /// [`PlanError::EmptyQuantiles`] for an empty list,
    /// [`PlanError::QuantileOutOfRange`] for a value outside `[0, 1]` or NaN.
    pub fn new(quantiles: Vec<f64>) -> Result<Self, PlanError> {
        if quantiles.is_empty() {
            return Err(PlanError::EmptyQuantiles);
        }
        if let Some(&q) = quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(PlanError::QuantileOutOfRange(q));
        }
        Ok(Self { quantiles })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.quantiles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quantiles.len()
    }

    /// Always `false`; construction rejects empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantiles.is_empty()
    }

    /// Requested quantiles grouped by the rank index they select in a group
    /// of `n` values, ascending by index.
    fn by_rank(&self, n: u64) -> BTreeMap<u64, Vec<f64>> {
        let mut wanted: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
        for &q in &self.quantiles {
            wanted.entry(rank_index(q, n)).or_default().push(q);
        }
        wanted
    }
}

/// Zero-based nearest-rank index of `q` in `n` sorted values.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn rank_index(q: f64, n: u64) -> u64 {
    let rank = (q * n as f64).ceil() as u64;
    rank.saturating_sub(1).min(n.saturating_sub(1))
}

/// Percentiles of one key.
///
/// `percentiles` holds one `(quantile, value)` pair per requested quantile,
/// ordered by ascending rank, then by request order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentileResult<V> {
    /// Number of values the key had.
    pub count: u64,
    pub percentiles: Vec<(f64, V)>,
}

impl<V> PercentileResult<V> {
    /// Value selected for the first occurrence of quantile `q`.
    #[must_use]
    pub fn get(&self, q: f64) -> Option<&V> {
        self.percentiles
            .iter()
            .find(|(pq, _)| pq.to_bits() == q.to_bits())
            .map(|(_, v)| v)
    }

    /// Same count and the same pairs, in any order.
    #[must_use]
    pub fn same_pairs(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        if self.count != other.count || self.percentiles.len() != other.percentiles.len() {
            return false;
        }
        let mut unmatched: Vec<&(f64, V)> = other.percentiles.iter().collect();
        for (q, v) in &self.percentiles {
            match unmatched
                .iter()
                .position(|(oq, ov)| oq.to_bits() == q.to_bits() && ov == v)
            {
                Some(i) => {
                    unmatched.swap_remove(i);
                }
                None => return false,
            }
        }
        true
    }
}

/// Pick the requested percentiles from an ascending stream of `count` values.
///
/// Reads the stream once and stops at the highest requested rank: nothing
/// after it is pulled.
pub fn select_by_rank<V, I>(sorted: I, count: u64, quantiles: &QuantileSet) -> PercentileResult<V>
where
    V: Clone,
    I: IntoIterator<Item = V>,
{
    let mut pending = quantiles.by_rank(count).into_iter().peekable();
    let mut percentiles = Vec::with_capacity(quantiles.len());
    for (pos, v) in (0u64..).zip(sorted) {
        if let Some((_, qs)) = pending.next_if(|(idx, _)| *idx == pos) {
            percentiles.extend(qs.into_iter().map(|q| (q, v.clone())));
            if pending.peek().is_none() {
                break;
            }
        }
    }
    PercentileResult { count, percentiles }
}
