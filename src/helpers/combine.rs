//! Combine-by-key.
//!
//! Both entry points build a `CombineValues` barrier:
//! - the local phase folds each partition into a `StableMap<K, A>`,
//! - the merge folds the per-partition maps together and finishes every
//!   accumulator.
//!
//! `combine_values_lifted` additionally carries a local phase that builds an
//! accumulator from a whole group. The planner uses it to drop a preceding
//! `group_by_key`.

use crate::collection::LiftableCombiner;
use crate::node::{LocalFn, MergeFn, Node};
use crate::shuffle::{StableMap, split_rows};
use crate::{CombineFn, PCollection, Partition, RFBound};
use std::hash::Hash;
use std::sync::Arc;

/// `Vec<(K, V)>` to `StableMap<K, A>`.
fn local_pairs<K, V, A, O, C>(comb: Arc<C>) -> LocalFn
where
    K: RFBound + Eq + Hash,
    V: RFBound,
    A: Send + Sync + 'static,
    O: 'static,
    C: CombineFn<V, A, O>,
{
    Arc::new(move |p: Partition| -> Partition {
        let kv = *p
            .downcast::<Vec<(K, V)>>()
            .expect("combine local: expected Vec<(K, V)>");
        let mut map: StableMap<K, A> = StableMap::default();
        for (k, v) in kv {
            comb.add_input(map.entry(k).or_insert_with(|| comb.create()), v);
        }
        Box::new(map) as Partition
    })
}

/// Per-partition `StableMap<K, A>`s to `Vec<(K, O)>`, split `n` ways.
fn merge_accumulators<K, V, A, O, C>(comb: Arc<C>) -> MergeFn
where
    K: RFBound + Eq + Hash,
    V: 'static,
    A: Send + Sync + 'static,
    O: RFBound,
    C: CombineFn<V, A, O>,
{
    Arc::new(move |parts: Vec<Partition>, n: usize| -> Vec<Partition> {
        let mut accs: StableMap<K, A> = StableMap::default();
        for p in parts {
            let m = *p
                .downcast::<StableMap<K, A>>()
                .expect("combine merge: expected StableMap<K, A>");
            for (k, a) in m {
                match accs.get_mut(&k) {
                    Some(acc) => comb.merge(acc, a),
                    None => {
                        accs.insert(k, a);
                    }
                }
            }
        }
        let out: Vec<(K, O)> = accs
            .into_iter()
            .map(|(k, a)| (k, comb.finish(a)))
            .collect();
        split_rows(out, n)
    })
}

impl<K: RFBound + Eq + Hash, V: RFBound> PCollection<(K, V)> {
    /// Reduce the values of each key with `comb`.
    ///
    /// Each partition is pre-aggregated before the shuffle, so only one
    /// accumulator per key and partition crosses it.
    pub fn combine_values<C, A, O>(self, comb: C) -> PCollection<(K, O)>
    where
        C: CombineFn<V, A, O>,
        A: Send + Sync + 'static,
        O: RFBound,
    {
        let comb = Arc::new(comb);
        self.then(Node::CombineValues {
            local_pairs: local_pairs::<K, V, A, O, C>(Arc::clone(&comb)),
            local_groups: None,
            merge: merge_accumulators::<K, V, A, O, C>(comb),
        })
    }
}

impl<K, V> PCollection<(K, Vec<V>)>
where
    K: RFBound + Eq + Hash,
    V: RFBound,
{
    /// Reduce already-grouped values with a liftable combiner.
    ///
    /// Directly after `group_by_key()` the planner removes the grouping and
    /// combines the raw pairs instead.
    pub fn combine_values_lifted<C, A, O>(self, comb: C) -> PCollection<(K, O)>
    where
        C: LiftableCombiner<V, A, O>,
        A: Send + Sync + 'static,
        O: RFBound,
    {
        let comb = Arc::new(comb);

        let local_groups: LocalFn = {
            let comb = Arc::clone(&comb);
            Arc::new(move |p: Partition| -> Partition {
                let kvv = *p
                    .downcast::<Vec<(K, Vec<V>)>>()
                    .expect("lifted combine local: expected Vec<(K, Vec<V>)>");
                let mut map: StableMap<K, A> = StableMap::default();
                for (k, vs) in kvv {
                    let acc = comb.build_from_group(&vs);
                    match map.get_mut(&k) {
                        Some(prev) => comb.merge(prev, acc),
                        None => {
                            map.insert(k, acc);
                        }
                    }
                }
                Box::new(map) as Partition
            })
        };

        self.then(Node::CombineValues {
            local_pairs: local_pairs::<K, V, A, O, C>(Arc::clone(&comb)),
            local_groups: Some(local_groups),
            merge: merge_accumulators::<K, V, A, O, C>(comb),
        })
    }
}
