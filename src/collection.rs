//! The `PCollection` handle, the combiner traits, and the stateless operators
//! shared by the helper modules.

use crate::node::{DynOp, Node};
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::type_token::{Partition, TypeTag, vec_ops_for};
use std::marker::PhantomData;
use std::sync::Arc;

/// Bound required of every element type flowing through a pipeline.
///
/// Partitions never leave the process, so elements need no serde impls.
pub trait RFBound: 'static + Send + Sync + Clone {}
impl<T> RFBound for T where T: 'static + Send + Sync + Clone {}

/// A deferred, immutable collection of `T` inside a [`Pipeline`].
///
/// Keyed collections are `PCollection<(K, V)>`; that is the "table" every
/// statistic in this crate consumes.
#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    pub(crate) _t: PhantomData<T>,
}

impl<T> PCollection<T> {
    /// Insert `node` downstream of this collection and return a handle to it.
    pub(crate) fn then<O>(self, node: Node) -> PCollection<O> {
        let id = self.pipeline.insert_node(node);
        self.pipeline.connect(self.id, id);
        PCollection {
            pipeline: self.pipeline,
            id,
            _t: PhantomData,
        }
    }

    /// Append a single stateless operator.
    pub(crate) fn then_op<O>(self, op: Arc<dyn DynOp>) -> PCollection<O> {
        self.then(Node::Stateless(vec![op]))
    }

    /// Id of the node producing this collection, for [`Runner::run_collect`](crate::Runner::run_collect).
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The pipeline this collection belongs to.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// Create a source collection from an owned vector.
pub fn from_vec<T>(p: &Pipeline, data: Vec<T>) -> PCollection<T>
where
    T: RFBound,
{
    let id = p.insert_node(Node::Source {
        payload: Arc::new(data),
        vec_ops: vec_ops_for::<T>(),
        elem_tag: TypeTag::of::<T>(),
    });
    PCollection {
        pipeline: p.clone(),
        id,
        _t: PhantomData,
    }
}

/// Create a source collection from any owned iterator.
pub fn from_iter<T, I>(p: &Pipeline, iter: I) -> PCollection<T>
where
    T: RFBound,
    I: IntoIterator<Item = T>,
{
    from_vec(p, iter.into_iter().collect::<Vec<T>>())
}

/* ---------- Stateless DynOps ---------- */

pub(crate) struct MapOp<I, O, F>(pub F, pub PhantomData<(I, O)>);
impl<I, O, F> DynOp for MapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Partition {
        let v = *input.downcast::<Vec<I>>().expect("MapOp input");
        let out: Vec<O> = v.iter().map(|i| self.0(i)).collect();
        Box::new(out) as Partition
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

pub(crate) struct FilterOp<T, P>(pub P, pub PhantomData<T>);
impl<T, P> DynOp for FilterOp<T, P>
where
    T: RFBound,
    P: Send + Sync + Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Partition {
        let v = *input.downcast::<Vec<T>>().expect("FilterOp input");
        Box::new(v.into_iter().filter(|t| self.0(t)).collect::<Vec<T>>())
    }

    fn name(&self) -> &'static str {
        "filter"
    }

    fn cost_hint(&self) -> u8 {
        1
    }
}

pub(crate) struct FlatMapOp<I, O, F>(pub F, pub PhantomData<(I, O)>);
impl<I, O, F> DynOp for FlatMapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> Vec<O> + 'static,
{
    fn apply(&self, input: Partition) -> Partition {
        let v = *input.downcast::<Vec<I>>().expect("FlatMapOp input");
        let mut out: Vec<O> = Vec::new();
        for i in &v {
            out.extend(self.0(i));
        }
        Box::new(out)
    }

    fn name(&self) -> &'static str {
        "flat_map"
    }
}

pub(crate) struct MapValuesOp<K, V, O, F>(pub F, pub PhantomData<(K, V, O)>);
impl<K, V, O, F> DynOp for MapValuesOp<K, V, O, F>
where
    K: RFBound,
    V: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&V) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Partition {
        let kv = *input.downcast::<Vec<(K, V)>>().expect("MapValuesOp input");
        let out: Vec<(K, O)> = kv
            .into_iter()
            .map(|(k, v)| {
                let o = self.0(&v);
                (k, o)
            })
            .collect();
        Box::new(out)
    }

    fn name(&self) -> &'static str {
        "map_values"
    }

    fn cost_hint(&self) -> u8 {
        5
    }
}

/* ---------- Combiners ---------- */

/// An associative, commutative reduction of `V`s into an output `O` through an
/// accumulator `A`.
///
/// The runner may call `add_input` and `merge` in any grouping: once per
/// partition before the shuffle, then across partitions after it. `merge`
/// must therefore give the same result whatever order accumulators arrive in.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}

/// Combiners that can build an accumulator straight from a whole group.
///
/// Lets the planner drop a `group_by_key` that is immediately followed by
/// `combine_values_lifted`.
pub trait LiftableCombiner<V, A, O>: CombineFn<V, A, O> {
    fn build_from_group(&self, values: &[V]) -> A;
}

/// Number of values per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }
    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }
    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }
    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

impl<V> LiftableCombiner<V, u64, u64> for Count {
    fn build_from_group(&self, values: &[V]) -> u64 {
        values.len() as u64
    }
}
