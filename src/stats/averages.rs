use crate::combiners::{Mean, ToF64};
use crate::{PCollection, RFBound};
use std::hash::Hash;

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Eq + Hash,
    V: RFBound + ToF64,
{
    /// Arithmetic mean of the values of every key.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let t = from_vec(&p, vec![
    ///     ("a".to_string(), 2u32),
    ///     ("b".to_string(), 3),
    ///     ("a".to_string(), 10),
    /// ]);
    /// let mut means = t.mean_per_key().collect_seq().unwrap();
    /// means.sort_by(|x, y| x.0.cmp(&y.0));
    /// assert_eq!(means, vec![("a".to_string(), 6.0), ("b".to_string(), 3.0)]);
    /// ```
    pub fn mean_per_key(self) -> PCollection<(K, f64)> {
        self.combine_values(Mean)
    }
}
