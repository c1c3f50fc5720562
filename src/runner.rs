//! Plan execution.
//!
//! The runner walks a planned chain front to back:
//! - the `Source` is split into partitions (one partition when sequential),
//! - fused stateless blocks run per partition,
//! - barriers run their `local` phase per partition, then `merge` once,
//!   which re-splits the merged rows into the same number of partitions,
//! - `CoGroup` runs both of its sub-plans first, then joins them.
//!
//! In parallel mode every per-partition phase runs on the rayon pool.

use crate::node::{DynOp, Node};
use crate::planner::build_plan;
use crate::type_token::Partition;
use crate::{NodeId, Pipeline, RFBound};
use anyhow::{Result, anyhow, bail};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// How a plan is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    /// Single partition, single thread, in order.
    Sequential,
    /// Partitioned execution on rayon.
    ///
    /// `threads` builds a dedicated pool of that size; `partitions` overrides
    /// the planner's suggestion.
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

/// Executes plans built from a [`Pipeline`].
#[derive(Clone, Debug)]
pub struct Runner {
    pub mode: ExecMode,
    /// Partition count used when neither the caller nor the planner picks one.
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

/// Counters gathered while executing one plan.
#[derive(Clone, Copy, Debug, Default)]
struct RunStats {
    stages: u64,
    barriers: u64,
}

impl Runner {
    /// Plan and execute the graph ending at `terminal`, returning its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is inconsistent, a dedicated thread pool
    /// cannot be built, or the terminal rows are not `Vec<T>`.
    pub fn run_collect<T: RFBound>(&self, p: &Pipeline, terminal: NodeId) -> Result<Vec<T>> {
        let plan = build_plan(p, terminal)?;

        #[cfg(feature = "metrics")]
        let metrics = p.metrics();
        #[cfg(feature = "metrics")]
        if let Some(m) = &metrics {
            m.record_start();
        }

        let (parallel, parts) = match self.mode {
            ExecMode::Sequential => (false, 1),
            ExecMode::Parallel { partitions, .. } => (
                true,
                partitions
                    .or(plan.suggested_partitions)
                    .unwrap_or(self.default_partitions)
                    .max(1),
            ),
        };
        info!(
            mode = ?self.mode,
            partitions = parts,
            steps = plan.chain.len(),
            "executing plan"
        );

        let mut stats = RunStats::default();
        let out = match self.mode {
            ExecMode::Parallel {
                threads: Some(t), ..
            } => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(t).build()?;
                pool.install(|| exec_chain(&plan.chain, parts, parallel, &mut stats))?
            }
            _ => exec_chain(&plan.chain, parts, parallel, &mut stats)?,
        };
        let rows = collect_terminal::<T>(out)?;

        #[cfg(feature = "metrics")]
        if let Some(m) = &metrics {
            m.record_end();
            m.increment_counter("stages_executed", stats.stages);
            m.increment_counter("barriers_executed", stats.barriers);
            m.set_counter("partitions", parts as u64);
            m.increment_counter("elements_out", rows.len() as u64);
        }
        debug!(
            stages = stats.stages,
            barriers = stats.barriers,
            rows = rows.len(),
            "plan finished"
        );
        Ok(rows)
    }
}

/// Execute a linear chain and return its output partitions.
fn exec_chain(
    chain: &[Node],
    n: usize,
    parallel: bool,
    stats: &mut RunStats,
) -> Result<Vec<Partition>> {
    let Some((first, rest)) = chain.split_first() else {
        bail!("empty plan");
    };
    let mut parts: Vec<Partition> = match first {
        Node::Source {
            payload, vec_ops, ..
        } => if parallel {
            vec_ops.split(payload.as_ref(), n)
        } else {
            vec_ops.clone_any(payload.as_ref()).map(|p| vec![p])
        }
        .ok_or_else(|| anyhow!("source payload does not match its element type"))?,
        other => bail!("plan must start with a Source node, found {}", other.kind()),
    };

    for node in rest {
        parts = match node {
            Node::Source { .. } => bail!("unexpected additional source in plan"),
            Node::Stateless(ops) => map_parts(parts, parallel, |p| fuse_stateless(ops, p)),
            Node::GroupByKey { local, merge }
            | Node::SortGroups { local, merge }
            | Node::SortGlobal { local, merge } => {
                merge(map_parts(parts, parallel, |p| local(p)), n)
            }
            Node::CombineValues {
                local_pairs,
                local_groups,
                merge,
            } => {
                let local = local_groups.as_ref().unwrap_or(local_pairs);
                merge(map_parts(parts, parallel, |p| local(p)), n)
            }
            Node::CoGroup {
                left_chain,
                right_chain,
                coalesce_left,
                coalesce_right,
                exec,
            } => {
                let left = exec_chain(left_chain, n, parallel, stats)?;
                let right = exec_chain(right_chain, n, parallel, stats)?;
                exec(coalesce_left(left), coalesce_right(right), n)
            }
        };
        stats.stages += 1;
        if node.is_barrier() {
            stats.barriers += 1;
        }
        debug!(node = node.kind(), partitions = parts.len(), "stage done");
    }
    Ok(parts)
}

/// Run `f` over every partition, on rayon when `parallel`.
fn map_parts<F>(parts: Vec<Partition>, parallel: bool, f: F) -> Vec<Partition>
where
    F: Fn(Partition) -> Partition + Send + Sync,
{
    if parallel {
        parts.into_par_iter().map(f).collect()
    } else {
        parts.into_iter().map(f).collect()
    }
}

/// Run a fused stateless stage.
fn fuse_stateless(ops: &[Arc<dyn DynOp>], input: Partition) -> Partition {
    ops.iter().fold(input, |acc, op| op.apply(acc))
}

fn collect_terminal<T: 'static>(parts: Vec<Partition>) -> Result<Vec<T>> {
    let mut out = Vec::<T>::new();
    for part in parts {
        let mut v = *part
            .downcast::<Vec<T>>()
            .map_err(|_| anyhow!("terminal type mismatch"))?;
        out.append(&mut v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_vec;

    #[test]
    fn sequential_and_parallel_agree() {
        let p = Pipeline::default();
        let c = from_vec(&p, (0..1_000u32).collect::<Vec<_>>()).map(|x: &u32| x * 3);

        let seq = Runner {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
        .run_collect::<u32>(&p, c.id)
        .unwrap();
        let par = Runner {
            mode: ExecMode::Parallel {
                threads: Some(2),
                partitions: Some(7),
            },
            ..Default::default()
        }
        .run_collect::<u32>(&p, c.id)
        .unwrap();

        assert_eq!(seq, par);
        assert_eq!(seq[999], 2997);
    }

    #[test]
    fn terminal_type_mismatch_is_an_error() {
        let p = Pipeline::default();
        let c = from_vec(&p, vec![1u8, 2, 3]);
        let err = Runner::default().run_collect::<String>(&p, c.id).unwrap_err();
        assert!(err.to_string().contains("terminal type mismatch"));
    }
}
