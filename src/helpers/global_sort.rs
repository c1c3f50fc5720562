use crate::node::Node;
use crate::shuffle::{SortedGroup, split_rows};
use crate::{PCollection, Partition, RFBound};
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Totally order the collection ascending by `key(&T)`.
    ///
    /// Every partition sorts locally (stable); the barrier k-way merges the
    /// sorted partitions and re-splits them into contiguous, ordered ranges.
    /// Collecting afterwards yields the whole collection in key order.
    ///
    /// ```
    /// use rankflow::*;
    /// use std::cmp::Reverse;
    ///
    /// let p = Pipeline::default();
    /// let out = from_vec(&p, vec![3u32, 9, 1, 7])
    ///     .sort_globally_by_key(|x: &u32| Reverse(*x))
    ///     .collect_par(None, Some(3))
    ///     .unwrap();
    /// assert_eq!(out, vec![9, 7, 3, 1]);
    /// ```
    pub fn sort_globally_by_key<S, F>(self, key: F) -> PCollection<T>
    where
        S: Ord + Send + Sync + 'static,
        F: 'static + Send + Sync + Fn(&T) -> S,
    {
        let local = Arc::new(move |p: Partition| -> Partition {
            let rows = *p
                .downcast::<Vec<T>>()
                .expect("global sort local: expected Vec<T>");
            let mut keyed: Vec<(S, T)> = rows.into_iter().map(|t| (key(&t), t)).collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Box::new(keyed) as Partition
        });

        let merge = Arc::new(|parts: Vec<Partition>, n: usize| -> Vec<Partition> {
            let runs: Vec<Vec<(S, T)>> = parts
                .into_iter()
                .map(|p| {
                    *p.downcast::<Vec<(S, T)>>()
                        .expect("global sort merge: expected sorted run")
                })
                .collect();
            let rows: Vec<T> = SortedGroup::new(runs).map(|(_, t)| t).collect();
            split_rows(rows, n)
        });

        self.then(Node::SortGlobal { local, merge })
    }
}
