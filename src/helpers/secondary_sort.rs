//! Group, sort within group, apply.
//!
//! `sort_and_apply` is the secondary-sort primitive. Rows `(K, (S, V))` are
//! grouped by `K`, and each group is handed to the caller as a
//! [`SortedGroup`] that yields `(S, V)` ascending by `S`.
//!
//! Sorting happens before the shuffle: each partition sorts its own run of
//! every key. The merge only collects the runs, and the caller's closure
//! drives a lazy k-way merge over them. A closure that stops early (top-K)
//! never merges the rest of its group.

use crate::node::{DynOp, Node};
use crate::shuffle::{SortedGroup, StableMap, split_rows};
use crate::{PCollection, Partition, RFBound};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

type Runs<S, V> = Vec<Vec<(S, V)>>;

/// Turns each `(K, runs)` row into `(K, f(&K, merged runs))`.
struct ApplySortedOp<K, S, V, O, F>(F, PhantomData<(K, S, V, O)>);

impl<K, S, V, O, F> DynOp for ApplySortedOp<K, S, V, O, F>
where
    K: RFBound,
    S: RFBound + Ord,
    V: RFBound,
    O: RFBound,
    F: 'static + Send + Sync + Fn(&K, SortedGroup<S, V>) -> O,
{
    fn apply(&self, input: Partition) -> Partition {
        let groups = *input
            .downcast::<Vec<(K, Runs<S, V>)>>()
            .expect("sort_and_apply: expected sorted runs per key");
        let out: Vec<(K, O)> = groups
            .into_iter()
            .map(|(k, runs)| {
                let o = self.0(&k, SortedGroup::new(runs));
                (k, o)
            })
            .collect();
        Box::new(out) as Partition
    }

    fn name(&self) -> &'static str {
        "apply_sorted"
    }

    fn cost_hint(&self) -> u8 {
        20
    }
}

impl<K, S, V> PCollection<(K, (S, V))>
where
    K: RFBound + Eq + Hash,
    S: RFBound + Ord,
    V: RFBound,
{
    /// Group by `K`, sort each group ascending by `S`, then call `f` once per
    /// group. Equal `S` keep their arrival order.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let rows = from_vec(&p, vec![
    ///     ("k".to_string(), (3u32, 'c')),
    ///     ("k".to_string(), (1, 'a')),
    ///     ("k".to_string(), (2, 'b')),
    /// ]);
    /// let firsts = rows
    ///     .sort_and_apply(|_k, group| group.take(2).map(|(_, v)| v).collect::<String>())
    ///     .collect_seq()
    ///     .unwrap();
    /// assert_eq!(firsts, vec![("k".to_string(), "ab".to_string())]);
    /// ```
    pub fn sort_and_apply<O, F>(self, f: F) -> PCollection<(K, O)>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&K, SortedGroup<S, V>) -> O,
    {
        let local = Arc::new(|p: Partition| -> Partition {
            let rows = *p
                .downcast::<Vec<(K, (S, V))>>()
                .expect("sort groups local: expected Vec<(K, (S, V))>");
            let mut runs: StableMap<K, Vec<(S, V)>> = StableMap::default();
            for (k, sv) in rows {
                runs.entry(k).or_default().push(sv);
            }
            for run in runs.values_mut() {
                run.sort_by(|a, b| a.0.cmp(&b.0));
            }
            Box::new(runs) as Partition
        });

        let merge = Arc::new(|parts: Vec<Partition>, n: usize| -> Vec<Partition> {
            let mut groups: StableMap<K, Runs<S, V>> = StableMap::default();
            for p in parts {
                let m = *p
                    .downcast::<StableMap<K, Vec<(S, V)>>>()
                    .expect("sort groups merge: bad part");
                for (k, run) in m {
                    groups.entry(k).or_default().push(run);
                }
            }
            split_rows(groups.into_iter().collect::<Vec<(K, Runs<S, V>)>>(), n)
        });

        let op: Arc<dyn DynOp> = Arc::new(ApplySortedOp::<K, S, V, O, F>(f, PhantomData));
        self.then::<(K, Runs<S, V>)>(Node::SortGroups { local, merge })
            .then_op(op)
    }
}
