//! Type tags and type-erased vector helpers.
//!
//! - [`TypeTag`]: a runtime type identifier attached to `Source` nodes so the
//!   planner can describe element types without carrying generics.
//! - [`VecOps`]: a type-erased interface for the `Vec<T>` operations the runner
//!   needs on a source payload (length, splitting, cloning). Concrete
//!   implementations come from [`vec_ops_for`].
//!
//! All operations return `None` if the dynamic type does not match the
//! expected `Vec<T>`.

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A partition buffer carried between nodes at runtime.
///
/// Intermediate results are opaque, type-erased partitions. Node closures
/// downcast them to the concrete type they were built for (e.g. `Vec<(K, V)>`).
pub type Partition = Box<dyn Any + Send + Sync>;

/// A lightweight runtime type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    /// Stable Rust type identifier.
    pub id: TypeId,
    /// Human-readable type name (best-effort).
    pub name: &'static str,
}

impl TypeTag {
    /// Construct a tag for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// Type-erased helpers for `Vec<T>`.
///
/// The runner uses `VecOps` to size the source (`len`), split it into
/// partitions for parallel execution (`split`), and copy it whole for
/// sequential execution (`clone_any`).
pub trait VecOps: Send + Sync {
    /// Return the number of elements if `data` is a `Vec<T>`, otherwise `None`.
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Split `data` (a `Vec<T>`) into `min(n, len)` contiguous partitions
    /// whose sizes differ by at most one. An empty vector yields one empty
    /// partition.
    ///
    /// Concatenating the partitions yields the original vector.
    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>>;

    /// Clone the entire `Vec<T>` behind `data` and return it boxed as a [`Partition`].
    fn clone_any(&self, data: &dyn Any) -> Option<Partition>;
}

/// Concrete `VecOps` for a specific `T`.
pub struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        let n = n.clamp(1, v.len().max(1));
        let (base, extra) = (v.len() / n, v.len() % n);

        let mut parts: Vec<Partition> = Vec::with_capacity(n);
        let mut start = 0;
        for i in 0..n {
            let end = start + base + usize::from(i < extra);
            parts.push(Box::new(v[start..end].to_vec()));
            start = end;
        }
        Some(parts)
    }

    fn clone_any(&self, data: &dyn Any) -> Option<Partition> {
        data.downcast_ref::<Vec<T>>()
            .map(|v| Box::new(v.clone()) as Partition)
    }
}

/// Create a type-erased `VecOps` for `Vec<T>`.
#[must_use]
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}
