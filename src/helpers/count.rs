use crate::{Count, PCollection, RFBound};
use std::hash::Hash;

impl<T: RFBound + Eq + Hash> PCollection<T> {
    /// Number of occurrences of every distinct element: `T` to `(T, u64)`.
    ///
    /// Counting a keyed table's keys is `table.keys().count_per_element()`.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let words = from_vec(&p, vec!["b".to_string(), "a".to_string(), "b".to_string()]);
    /// let mut counts = words.count_per_element().collect_seq().unwrap();
    /// counts.sort();
    /// assert_eq!(counts, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    /// ```
    pub fn count_per_element(self) -> PCollection<(T, u64)> {
        self.map(|t: &T| (t.clone(), ())).combine_values(Count)
    }
}
