//! Projections and rewrites of keyed rows.
//!
//! - [`map_values`](crate::PCollection::map_values): `(K, V)` to `(K, O)`
//! - [`keys`](crate::PCollection::keys) / [`values`](crate::PCollection::values): drop one side
//! - [`swap_kv`](crate::PCollection::swap_kv): `(K, V)` to `(V, K)`
//! - [`negate_counts`](crate::PCollection::negate_counts): `(K, u64)` to `(K, i64)`, negated,
//!   so an ascending sort orders by descending count
//!
//! ```
//! use rankflow::*;
//!
//! let p = Pipeline::default();
//! let kv = from_vec(&p, vec![("x".to_string(), 2u64), ("y".to_string(), 5)]);
//! let out = kv.negate_counts().collect_seq().unwrap();
//! assert_eq!(out, vec![("x".to_string(), -2i64), ("y".to_string(), -5)]);
//! ```

use crate::collection::MapValuesOp;
use crate::node::DynOp;
use crate::{PCollection, RFBound};
use std::marker::PhantomData;
use std::sync::Arc;

impl<K: RFBound, V: RFBound> PCollection<(K, V)> {
    /// Transform only the value of each row, keeping its key.
    pub fn map_values<O, F>(self, f: F) -> PCollection<(K, O)>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&V) -> O,
    {
        let op: Arc<dyn DynOp> = Arc::new(MapValuesOp::<K, V, O, F>(f, PhantomData));
        self.then_op(op)
    }

    /// The key of every row, duplicates included.
    pub fn keys(self) -> PCollection<K> {
        self.map(|(k, _): &(K, V)| k.clone())
    }

    /// The value of every row.
    pub fn values(self) -> PCollection<V> {
        self.map(|(_, v): &(K, V)| v.clone())
    }

    pub fn swap_kv(self) -> PCollection<(V, K)> {
        self.map(|(k, v): &(K, V)| (v.clone(), k.clone()))
    }
}

impl<K: RFBound> PCollection<(K, u64)> {
    /// Negate every count.
    ///
    /// Counts above `i64::MAX` saturate to `i64::MIN + 1`.
    pub fn negate_counts(self) -> PCollection<(K, i64)> {
        self.map_values(|c: &u64| -i64::try_from(*c).unwrap_or(i64::MAX))
    }
}
