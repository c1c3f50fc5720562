//! The pipeline graph container.
//!
//! A [`Pipeline`] is a cheap, cloneable handle to a shared graph of
//! [`Node`]s. Every `PCollection` holds a clone of the handle plus the id of
//! the node that produces it. Nothing executes until a collect method runs the
//! plan ending at that node.

use crate::node::Node;
use crate::node_id::NodeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "metrics")]
use crate::metrics::MetricsCollector;

/// Handle to a shared computation graph.
#[derive(Clone, Default)]
pub struct Pipeline {
    pub(crate) inner: Arc<Mutex<PipelineInner>>,
}

#[derive(Default)]
pub struct PipelineInner {
    pub next_id: u64,
    pub nodes: HashMap<NodeId, Node>,
    pub edges: Vec<(NodeId, NodeId)>,
    #[cfg(feature = "metrics")]
    pub metrics: Option<MetricsCollector>,
}

impl Pipeline {
    // Graph mutations never leave the inner state half-written, so a
    // poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert_node(&self, node: Node) -> NodeId {
        let mut g = self.lock();
        let id = NodeId::new(g.next_id);
        g.next_id += 1;
        g.nodes.insert(id, node);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        self.lock().edges.push((from, to));
    }

    /// Copy of the current graph. `Node` clones only bump `Arc` counts.
    pub(crate) fn snapshot(&self) -> (HashMap<NodeId, Node>, Vec<(NodeId, NodeId)>) {
        let g = self.lock();
        (g.nodes.clone(), g.edges.clone())
    }

    /// Number of nodes inserted so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Attach a metrics collector. The runner records into it on every collect.
    #[cfg(feature = "metrics")]
    pub fn set_metrics(&self, metrics: MetricsCollector) {
        self.lock().metrics = Some(metrics);
    }

    /// Detach and return the metrics collector, if any.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn take_metrics(&self) -> Option<MetricsCollector> {
        self.lock().metrics.take()
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics(&self) -> Option<MetricsCollector> {
        self.lock().metrics.clone()
    }
}
