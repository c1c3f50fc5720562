//! Key-based inner join built on a co-group plan.
//!
//! `join_inner` inserts a `CoGroup` node that:
//! 1. captures the optimized sub-plans ending at the two input collections,
//! 2. runs each sub-plan and coalesces it into one `Vec<(K, V)>` / `Vec<(K, W)>`,
//! 3. indexes the right side by key and probes it with every left row,
//! 4. splits the joined rows into the runner's partition count.
//!
//! The outer plan is anchored on a one-element dummy `Source`. It carries no data.

use crate::node::{CoalesceFn, Node};
use crate::planner::optimized_chain;
use crate::shuffle::{StableMap, concat_parts, split_rows};
use crate::type_token::{TypeTag, vec_ops_for};
use crate::{NodeId, PCollection, Partition, Pipeline, RFBound};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

fn insert_dummy_source(p: &Pipeline) -> NodeId {
    p.insert_node(Node::Source {
        payload: Arc::new(vec![0u8]),
        vec_ops: vec_ops_for::<u8>(),
        elem_tag: TypeTag::of::<u8>(),
    })
}

fn coalesce<T: Send + Sync + 'static>(what: &'static str) -> CoalesceFn {
    Arc::new(move |parts: Vec<Partition>| -> Partition {
        Box::new(concat_parts::<T>(parts, what)) as Partition
    })
}

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Eq + Hash,
    V: RFBound,
{
    /// Inner join with another `(K, W)` table: one `(K, (V, W))` row for every
    /// pair of rows sharing a key.
    ///
    /// Rows come out grouped by left row, in left order, then in right order.
    ///
    /// ```
    /// use rankflow::*;
    ///
    /// let p = Pipeline::default();
    /// let left = from_vec(&p, vec![("a".to_string(), 1u32), ("b".to_string(), 2)]);
    /// let right = from_vec(&p, vec![("a".to_string(), 'x'), ("a".to_string(), 'y')]);
    /// let joined = left.join_inner(&right).collect_seq().unwrap();
    /// assert_eq!(
    ///     joined,
    ///     vec![("a".to_string(), (1, 'x')), ("a".to_string(), (1, 'y'))]
    /// );
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if either sub-plan references a node missing from its graph.
    #[must_use]
    pub fn join_inner<W>(&self, right: &PCollection<(K, W)>) -> PCollection<(K, (V, W))>
    where
        W: RFBound,
    {
        let (left_chain, _) =
            optimized_chain(&self.pipeline, self.id).expect("join: left sub-plan");
        let (right_chain, _) =
            optimized_chain(&right.pipeline, right.id).expect("join: right sub-plan");

        let exec = Arc::new(|left_part: Partition, right_part: Partition, n: usize| {
            let left_rows = *left_part
                .downcast::<Vec<(K, V)>>()
                .expect("cogroup exec: left type Vec<(K, V)>");
            let right_rows = *right_part
                .downcast::<Vec<(K, W)>>()
                .expect("cogroup exec: right type Vec<(K, W)>");

            let mut index: StableMap<K, Vec<W>> = StableMap::default();
            for (k, w) in right_rows {
                index.entry(k).or_default().push(w);
            }

            let mut out: Vec<(K, (V, W))> = Vec::new();
            for (k, v) in left_rows {
                if let Some(ws) = index.get(&k) {
                    out.extend(ws.iter().map(|w| (k.clone(), (v.clone(), w.clone()))));
                }
            }
            split_rows(out, n)
        });

        let source_id = insert_dummy_source(&self.pipeline);
        let id = self.pipeline.insert_node(Node::CoGroup {
            left_chain: Arc::new(left_chain),
            right_chain: Arc::new(right_chain),
            coalesce_left: coalesce::<(K, V)>("coalesce left: Vec<(K, V)>"),
            coalesce_right: coalesce::<(K, W)>("coalesce right: Vec<(K, W)>"),
            exec,
        });
        self.pipeline.connect(source_id, id);
        PCollection {
            pipeline: self.pipeline.clone(),
            id,
            _t: PhantomData,
        }
    }
}
