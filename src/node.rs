//! Execution graph nodes.
//!
//! Every node is type-erased: typed closures are captured when the node is
//! built by a `PCollection` method, and the runner only moves [`Partition`]s
//! between them.
//!
//! Barrier nodes (`GroupByKey`, `CombineValues`, `SortGroups`, `SortGlobal`)
//! all follow the same two-phase contract:
//! - `local`: runs once per input partition, in parallel, producing a
//!   partition-local partial result (a map of groups, of accumulators, or of
//!   sorted runs).
//! - `merge`: receives every partial result at once. This is the shuffle
//!   barrier. It returns the merged rows split into the requested number of
//!   output partitions, with no key spanning two partitions.

use crate::type_token::{Partition, TypeTag, VecOps};
use std::any::Any;
use std::sync::Arc;

/// Per-partition phase of a barrier.
pub type LocalFn = Arc<dyn Fn(Partition) -> Partition + Send + Sync>;

/// Cross-partition phase of a barrier: partials in, `n` output partitions out.
pub type MergeFn = Arc<dyn Fn(Vec<Partition>, usize) -> Vec<Partition> + Send + Sync>;

/// Concatenates the partitions of one side of a co-group into a single buffer.
pub type CoalesceFn = Arc<dyn Fn(Vec<Partition>) -> Partition + Send + Sync>;

/// Joins the two coalesced sides of a co-group into `n` output partitions.
pub type CoGroupFn = Arc<dyn Fn(Partition, Partition, usize) -> Vec<Partition> + Send + Sync>;

/// A stateless, element-wise operator applied to a whole partition.
pub trait DynOp: Send + Sync {
    fn apply(&self, input: Partition) -> Partition;

    /// Short label used by plan explanations.
    fn name(&self) -> &'static str {
        "op"
    }

    /// Relative cost of the operator, used by plan explanations.
    fn cost_hint(&self) -> u8 {
        10
    }
}

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        vec_ops: Arc<dyn VecOps>,
        elem_tag: TypeTag,
    },
    Stateless(Vec<Arc<dyn DynOp>>),

    /// Group-by-key:
    /// - `local`: `Vec<(K, V)>` → `StableMap<K, Vec<V>>`
    /// - `merge`: → `Vec<(K, Vec<V>)>`
    GroupByKey { local: LocalFn, merge: MergeFn },

    /// Combine-by-key
    /// - `local_pairs`: consumes `Vec<(K, V)>` → `StableMap<K, A>`
    /// - `local_groups`: optional lifted local that consumes `Vec<(K, Vec<V>)>` → `StableMap<K, A>`
    /// - `merge`: merges the accumulator maps → `Vec<(K, O)>`
    CombineValues {
        local_pairs: LocalFn,
        local_groups: Option<LocalFn>,
        merge: MergeFn,
    },

    /// Secondary-sort shuffle:
    /// - `local`: `Vec<(K, (S, V))>` → `StableMap<K, Vec<(S, V)>>`, each run sorted by `S`
    /// - `merge`: → `Vec<(K, Vec<Vec<(S, V)>>)>`, the sorted runs of every key
    SortGroups { local: LocalFn, merge: MergeFn },

    /// Total sort of an unkeyed collection:
    /// - `local`: sorts each partition
    /// - `merge`: k-way merges the sorted partitions
    SortGlobal { local: LocalFn, merge: MergeFn },

    /// Binary co-group. `left_chain` and `right_chain` are full sub-plans
    /// producing `Vec<(K, V)>` and `Vec<(K, W)>`. They are executed first,
    /// coalesced, then handed to `exec`.
    CoGroup {
        left_chain: Arc<Vec<Node>>,
        right_chain: Arc<Vec<Node>>,
        coalesce_left: CoalesceFn,
        coalesce_right: CoalesceFn,
        exec: CoGroupFn,
    },
}

impl Node {
    /// Short label for logs and plan explanations.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Source { .. } => "Source",
            Self::Stateless(_) => "Stateless",
            Self::GroupByKey { .. } => "GroupByKey",
            Self::CombineValues { .. } => "CombineValues",
            Self::SortGroups { .. } => "SortGroups",
            Self::SortGlobal { .. } => "SortGlobal",
            Self::CoGroup { .. } => "CoGroup",
        }
    }

    /// Whether executing this node requires every upstream partition.
    #[must_use]
    pub const fn is_barrier(&self) -> bool {
        !matches!(self, Self::Source { .. } | Self::Stateless(_))
    }
}
