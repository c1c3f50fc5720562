//! Assertions for pipeline outputs.
//!
//! Pipeline output order depends on the execution mode, so most helpers here
//! compare up to reordering:
//!
//! - [`assert_collections_equal`]: exact, order-dependent
//! - [`assert_collections_unordered_equal`]: same multiset of elements
//! - [`assert_kv_collections_equal`]: same rows after sorting by key
//! - [`assert_means_close`]: keyed `f64` results within a tolerance
//! - [`assert_percentiles_eq`]: keyed percentile results, pairs compared unordered

use crate::stats::PercentileResult;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// ```
/// use rankflow::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, in any order.
///
/// # Panics
///
/// Panics if some element occurs a different number of times.
///
/// ```
/// use rankflow::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 1], &[1, 3, 1]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let mut counts: HashMap<&T, i64> = HashMap::new();
    for a in actual {
        *counts.entry(a).or_default() += 1;
    }
    for e in expected {
        *counts.entry(e).or_default() -= 1;
    }
    let diff: Vec<(&T, i64)> = counts.into_iter().filter(|(_, c)| *c != 0).collect();
    assert!(
        diff.is_empty(),
        "Collection content mismatch (element, actual minus expected): {diff:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that two keyed collections are equal after a stable sort by key.
///
/// # Panics
///
/// Panics if the sorted collections differ.
///
/// ```
/// use rankflow::testing::assert_kv_collections_equal;
///
/// assert_kv_collections_equal(vec![("b", 2), ("a", 1)], vec![("a", 1), ("b", 2)]);
/// ```
pub fn assert_kv_collections_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
{
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));
    assert_collections_equal(&actual, &expected);
}

/// Assert that keyed `f64` results match within `eps` (absolute).
///
/// NaN is only equal to NaN; infinities only to themselves.
///
/// # Panics
///
/// Panics on a missing or extra key, or a value further than `eps` away.
pub fn assert_means_close<K>(actual: Vec<(K, f64)>, expected: Vec<(K, f64)>, eps: f64)
where
    K: Debug + Eq + Hash,
{
    let expected: HashMap<K, f64> = expected.into_iter().collect();
    assert_eq!(
        actual.len(),
        expected.len(),
        "Key count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (k, a) in &actual {
        let Some(e) = expected.get(k) else {
            panic!("Unexpected key {k:?} with value {a}");
        };
        #[allow(clippy::float_cmp)]
        let close = (a.is_nan() && e.is_nan()) || a == e || (a - e).abs() <= eps;
        assert!(close, "Value mismatch for key {k:?}: expected {e}, actual {a}");
    }
}

/// Assert that two keyed percentile outputs agree.
///
/// Keys may come in any order; each key's `(quantile, value)` pairs are
/// compared as an unordered collection and the counts must match.
///
/// # Panics
///
/// Panics on a missing or extra key, a count mismatch, or differing pairs.
///
/// ```
/// use rankflow::PercentileResult;
/// use rankflow::testing::assert_percentiles_eq;
///
/// let a = vec![("k", PercentileResult { count: 2, percentiles: vec![(0.5, 1), (1.0, 2)] })];
/// let b = vec![("k", PercentileResult { count: 2, percentiles: vec![(1.0, 2), (0.5, 1)] })];
/// assert_percentiles_eq(a, b);
/// ```
pub fn assert_percentiles_eq<K, V>(
    actual: Vec<(K, PercentileResult<V>)>,
    expected: Vec<(K, PercentileResult<V>)>,
) where
    K: Debug + Eq + Hash,
    V: Debug + PartialEq,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Key count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    let expected: HashMap<K, PercentileResult<V>> = expected.into_iter().collect();
    for (k, a) in &actual {
        let Some(e) = expected.get(k) else {
            panic!("Unexpected key {k:?} with result {a:?}");
        };
        assert!(
            a.same_pairs(e),
            "Percentile mismatch for key {k:?}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "content mismatch")]
    fn unordered_equal_respects_multiplicity() {
        assert_collections_unordered_equal(&[1, 1, 2], &[1, 2, 2]);
    }

    #[test]
    #[should_panic(expected = "Percentile mismatch")]
    fn percentiles_detect_count_difference() {
        let a = vec![(1u8, PercentileResult { count: 3, percentiles: vec![(0.5, 'b')] })];
        let b = vec![(1u8, PercentileResult { count: 4, percentiles: vec![(0.5, 'b')] })];
        assert_percentiles_eq(a, b);
    }

    #[test]
    fn means_tolerate_rounding() {
        assert_means_close(vec![("a", 0.1 + 0.2)], vec![("a", 0.3)], 1e-12);
        assert_means_close(vec![("n", f64::NAN)], vec![("n", f64::NAN)], 0.0);
    }
}
