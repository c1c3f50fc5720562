//! Small value types shared by the statistics helpers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// An `f64` with a total order (`f64::total_cmp`), usable as a grouping key,
/// a secondary-sort key, or a percentile value.
///
/// Equality and hashing follow the same total order, so `-0.0` and `0.0` are
/// distinct and every `NaN` bit pattern equals itself.
///
/// ```
/// use rankflow::OrdF64;
///
/// let mut v = vec![OrdF64(2.5), OrdF64(-1.0), OrdF64(0.0)];
/// v.sort();
/// assert_eq!(v, vec![OrdF64(-1.0), OrdF64(0.0), OrdF64(2.5)]);
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrdF64(pub f64);

impl PartialEq for OrdF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for OrdF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for OrdF64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<OrdF64> for f64 {
    fn from(value: OrdF64) -> Self {
        value.0
    }
}
