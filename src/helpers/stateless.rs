//! Element-wise transforms and the collect entry points.
//!
//! `map`, `filter` and `flat_map` each append one stateless operator. The
//! planner fuses adjacent operators into a single stage, so chaining them costs
//! one pass over each partition.

use crate::collection::{FilterOp, FlatMapOp, MapOp};
use crate::node::DynOp;
use crate::planner::{ExecutionExplanation, build_plan};
use crate::{ExecMode, PCollection, RFBound, Runner};
use anyhow::Result;
use std::marker::PhantomData;
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Apply `f` to every element.
    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> O,
    {
        let op: Arc<dyn DynOp> = Arc::new(MapOp::<T, O, F>(f, PhantomData));
        self.then_op(op)
    }

    /// Keep the elements for which `pred` holds.
    pub fn filter<F>(self, pred: F) -> PCollection<T>
    where
        F: 'static + Send + Sync + Fn(&T) -> bool,
    {
        let op: Arc<dyn DynOp> = Arc::new(FilterOp::<T, F>(pred, PhantomData));
        self.then_op(op)
    }

    /// Replace every element with zero or more outputs.
    pub fn flat_map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> Vec<O>,
    {
        let op: Arc<dyn DynOp> = Arc::new(FlatMapOp::<T, O, F>(f, PhantomData));
        self.then_op(op)
    }

    /// Execute on the current thread with a single partition.
    ///
    /// # Errors
    ///
    /// Returns an error if planning or execution fails.
    pub fn collect_seq(self) -> Result<Vec<T>> {
        Runner {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
        .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Execute partitioned on rayon.
    ///
    /// `threads` builds a dedicated pool of that size instead of using the
    /// global one. `partitions` overrides the planner's suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if planning or execution fails, or the pool cannot be built.
    pub fn collect_par(self, threads: Option<usize>, partitions: Option<usize>) -> Result<Vec<T>> {
        Runner {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        }
        .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Describe the plan that would produce this collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is inconsistent.
    pub fn explain(&self) -> Result<ExecutionExplanation> {
        Ok(build_plan(&self.pipeline, self.id)?.explain())
    }
}
