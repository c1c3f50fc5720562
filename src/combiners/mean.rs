//! Running mean: a `(sum, count)` accumulator summed pairwise, divided at the end.

use crate::collection::{CombineFn, LiftableCombiner};
use crate::utils::OrdF64;
use ordered_float::OrderedFloat;

/// Lossy conversion of a numeric value into `f64` for averaging.
pub trait ToF64 {
    fn to_f64(&self) -> f64;
}

macro_rules! impl_to_f64 {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToF64 for $t {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless, clippy::unnecessary_cast)]
                #[inline]
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_to_f64!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl ToF64 for OrdF64 {
    fn to_f64(&self) -> f64 {
        self.0
    }
}

impl ToF64 for OrderedFloat<f64> {
    fn to_f64(&self) -> f64 {
        self.0
    }
}

/// Arithmetic mean per key.
///
/// Associative and commutative, so it pre-aggregates per partition. NaN and
/// infinite inputs propagate through the sum.
///
/// ```
/// use rankflow::*;
///
/// let p = Pipeline::default();
/// let means = from_vec(&p, vec![("a".to_string(), 2u32), ("a".to_string(), 10)])
///     .combine_values(Mean)
///     .collect_seq()
///     .unwrap();
/// assert_eq!(means, vec![("a".to_string(), 6.0)]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Mean;

impl<V: ToF64> CombineFn<V, (f64, u64), f64> for Mean {
    fn create(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), v: V) {
        acc.0 += v.to_f64();
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (f64, u64), other: (f64, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (f64, u64)) -> f64 {
        acc.0 / acc.1 as f64
    }
}

impl<V: ToF64> LiftableCombiner<V, (f64, u64), f64> for Mean {
    fn build_from_group(&self, values: &[V]) -> (f64, u64) {
        (values.iter().map(ToF64::to_f64).sum(), values.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_order_does_not_matter() {
        let m = Mean;
        let mut left = CombineFn::<u32, _, _>::create(&m);
        m.add_input(&mut left, 1u32);
        m.add_input(&mut left, 2u32);
        let right = LiftableCombiner::<u32, _, _>::build_from_group(&m, &[3u32, 6]);

        let mut a = left;
        CombineFn::<u32, _, _>::merge(&m, &mut a, right);
        let mut b = right;
        CombineFn::<u32, _, _>::merge(&m, &mut b, left);
        assert_eq!(a, b);
        assert!((CombineFn::<u32, _, _>::finish(&m, a) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_propagates() {
        let acc = LiftableCombiner::<f64, _, _>::build_from_group(&Mean, &[1.0, f64::NAN]);
        assert!(CombineFn::<f64, _, _>::finish(&Mean, acc).is_nan());
    }
}
