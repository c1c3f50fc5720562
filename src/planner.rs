//! Plan building.
//!
//! A pipeline graph is turned into one linear chain by walking back from the
//! terminal node. Two rewrites then run over the chain:
//!
//! - adjacent `Stateless` nodes are merged into one fused stage;
//! - a `GroupByKey` directly followed by a liftable `CombineValues` is removed,
//!   and the combine pre-aggregates raw pairs through `local_pairs` instead.
//!
//! Co-group nodes carry their own sub-chains, built by the same passes when
//! the join is declared. [`build_plan`] finally derives a partition count from
//! the source length, which the runner uses unless told otherwise.

use crate::node::Node;
use crate::{NodeId, Pipeline};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use tracing::debug;

/// An optimized chain ready for the runner.
pub struct Plan {
    /// Nodes in execution order, source first.
    pub chain: Vec<Node>,
    /// Partition count derived from the source length.
    pub suggested_partitions: Option<usize>,
    /// Rewrites applied while building `chain`.
    pub optimizations: Vec<OptimizationDecision>,
}

/// A rewrite applied by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationDecision {
    /// Adjacent stateless operations were fused together.
    FusedStateless {
        /// Number of stateless blocks before fusion.
        blocks_before: usize,
        /// Number of stateless blocks after fusion.
        blocks_after: usize,
        /// Total number of operations fused.
        ops_count: usize,
    },
    /// `GroupByKey` followed by `CombineValues` was lifted.
    LiftedGBKCombine,
    /// Partition count suggestion.
    PartitionSuggestion {
        /// Estimated source length.
        source_len: Option<usize>,
        /// Suggested partition count.
        partitions: usize,
    },
}

/// Detailed explanation of an execution plan.
#[derive(Debug, Clone)]
pub struct ExecutionExplanation {
    /// One entry per node of the linear chain.
    pub steps: Vec<ExplainStep>,
    /// Number of shuffle barriers in the chain.
    pub barriers: usize,
    /// Estimated source size, when the source can report it.
    pub source_size: Option<usize>,
    /// Optimization decisions made by the planner.
    pub optimizations: Vec<OptimizationDecision>,
}

/// A single step in the execution plan.
#[derive(Debug, Clone)]
pub struct ExplainStep {
    /// Step number in the execution sequence.
    pub step: usize,
    /// Type of node being executed.
    pub node_type: &'static str,
    /// Human-readable description of the operation.
    pub description: String,
    /// Whether this operation is a barrier (requires collecting all partitions).
    pub is_barrier: bool,
    /// Cost hint for this step.
    pub cost_hint: u64,
}

impl Display for ExecutionExplanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(f, "== execution plan ==")?;
        writeln!(
            f,
            "source size: {}",
            self.source_size
                .map_or_else(|| "unknown".to_string(), |s| s.to_string())
        )?;
        writeln!(f, "barriers:    {}", self.barriers)?;
        for step in &self.steps {
            let barrier = if step.is_barrier { " [BARRIER]" } else { "" };
            writeln!(
                f,
                "{:>3}. {}{} -- {} (cost {})",
                step.step, step.node_type, barrier, step.description, step.cost_hint
            )?;
        }
        for opt in &self.optimizations {
            match opt {
                OptimizationDecision::FusedStateless {
                    blocks_before,
                    blocks_after,
                    ops_count,
                } => writeln!(
                    f,
                    "  * fused {blocks_before} stateless blocks into {blocks_after} ({ops_count} ops)"
                )?,
                OptimizationDecision::LiftedGBKCombine => {
                    writeln!(f, "  * lifted GroupByKey into CombineValues")?;
                }
                OptimizationDecision::PartitionSuggestion {
                    source_len,
                    partitions,
                } => match source_len {
                    Some(len) => {
                        writeln!(f, "  * {partitions} partitions suggested for {len} rows")?;
                    }
                    None => writeln!(f, "  * {partitions} partitions suggested")?,
                },
            }
        }
        Ok(())
    }
}

impl Plan {
    /// Describe the plan step by step with rough costs.
    #[must_use]
    pub fn explain(&self) -> ExecutionExplanation {
        let mut steps = Vec::with_capacity(self.chain.len());
        let mut barriers = 0;
        let mut source_size = None;

        for (idx, node) in self.chain.iter().enumerate() {
            let (description, cost) = match node {
                Node::Source {
                    vec_ops,
                    payload,
                    elem_tag,
                } => {
                    source_size = vec_ops.len(payload.as_ref());
                    (format!("read {}", elem_tag.name), 1)
                }
                Node::Stateless(ops) => {
                    let names = ops.iter().map(|op| op.name()).collect::<Vec<_>>().join(" -> ");
                    let cost: u64 = ops.iter().map(|op| u64::from(op.cost_hint())).sum();
                    (names, cost)
                }
                Node::GroupByKey { .. } => ("group values by key".to_string(), 100),
                Node::CombineValues { local_groups, .. } => {
                    let mode = if local_groups.is_some() {
                        "from grouped input"
                    } else {
                        "with partial pre-aggregation"
                    };
                    (format!("combine values per key {mode}"), 80)
                }
                Node::SortGroups { .. } => {
                    ("group by key, sort each group by secondary key".to_string(), 120)
                }
                Node::SortGlobal { .. } => ("total sort of all elements".to_string(), 120),
                Node::CoGroup {
                    left_chain,
                    right_chain,
                    ..
                } => (
                    format!(
                        "co-group sub-plans of {} and {} steps",
                        left_chain.len(),
                        right_chain.len()
                    ),
                    150,
                ),
            };
            if node.is_barrier() {
                barriers += 1;
            }
            steps.push(ExplainStep {
                step: idx + 1,
                node_type: node.kind(),
                description,
                is_barrier: node.is_barrier(),
                cost_hint: cost,
            });
        }

        ExecutionExplanation {
            steps,
            barriers,
            source_size,
            optimizations: self.optimizations.clone(),
        }
    }
}

/// Plan the graph ending at `terminal`.
///
/// # Errors
///
/// Returns an error if the graph is missing a node on the path to `terminal`.
pub fn build_plan(p: &Pipeline, terminal: NodeId) -> Result<Plan> {
    let (chain, mut optimizations) = optimized_chain(p, terminal)?;
    let len_hint = estimate_source_len(&chain);

    let suggested = suggest_partitions(len_hint);
    if let Some(parts) = suggested {
        optimizations.push(OptimizationDecision::PartitionSuggestion {
            source_len: len_hint,
            partitions: parts,
        });
    }

    Ok(Plan {
        chain,
        suggested_partitions: suggested,
        optimizations,
    })
}

/// Backwalk from `terminal` and run the chain-level passes.
///
/// Also used by co-group builders to capture each side's sub-plan.
///
/// # Errors
///
/// Returns an error if the graph is missing a node on the path to `terminal`.
pub(crate) fn optimized_chain(
    p: &Pipeline,
    terminal: NodeId,
) -> Result<(Vec<Node>, Vec<OptimizationDecision>)> {
    let (nodes, edges) = p.snapshot();
    let chain = backwalk_linear(nodes, &edges, terminal)?;
    let mut optimizations = Vec::new();

    let (chain, fusion_opt) = fuse_stateless_tracked(chain);
    optimizations.extend(fusion_opt);

    let (chain, lift_opt) = lift_gbk_then_combine_tracked(chain);
    optimizations.extend(lift_opt);

    for opt in &optimizations {
        debug!(?opt, terminal = terminal.raw(), "planner rewrite");
    }
    Ok((chain, optimizations))
}

/// Follow predecessor edges from `terminal` up to its source and return the
/// nodes source first.
fn backwalk_linear(
    mut nodes: HashMap<NodeId, Node>,
    edges: &[(NodeId, NodeId)],
    terminal: NodeId,
) -> Result<Vec<Node>> {
    let mut chain = Vec::<Node>::new();
    let mut cur = terminal;
    loop {
        let n = nodes
            .remove(&cur)
            .ok_or_else(|| anyhow!("planner: missing node {cur:?}"))?;
        chain.push(n);
        if let Some((from, _)) = edges.iter().find(|(_, to)| *to == cur).copied() {
            cur = from;
        } else {
            break;
        }
    }
    chain.reverse();
    Ok(chain)
}

/* ---------- Stateless fusion ---------- */

fn fuse_stateless_tracked(chain: Vec<Node>) -> (Vec<Node>, Option<OptimizationDecision>) {
    let mut out = Vec::<Node>::with_capacity(chain.len());
    let mut blocks_before = 0;
    let mut total_ops = 0;

    for node in chain {
        if let Node::Stateless(ops) = node {
            blocks_before += 1;
            total_ops += ops.len();
            if let Some(Node::Stateless(prev)) = out.last_mut() {
                prev.extend(ops);
            } else {
                out.push(Node::Stateless(ops));
            }
        } else {
            out.push(node);
        }
    }

    let blocks_after = out
        .iter()
        .filter(|n| matches!(n, Node::Stateless(_)))
        .count();
    let optimization = (blocks_before > blocks_after).then_some(OptimizationDecision::FusedStateless {
        blocks_before,
        blocks_after,
        ops_count: total_ops,
    });

    (out, optimization)
}

/* ---------- GBK -> Combine lifting ---------- */

fn lift_gbk_then_combine_tracked(chain: Vec<Node>) -> (Vec<Node>, Option<OptimizationDecision>) {
    let mut out = Vec::with_capacity(chain.len());
    let mut lifted = false;

    for node in chain {
        let after_gbk = matches!(out.last(), Some(Node::GroupByKey { .. }));
        match node {
            Node::CombineValues {
                local_pairs,
                local_groups: Some(_),
                merge,
            } if after_gbk => {
                // Drop GBK; run CombineValues directly on (K, V) via local_pairs.
                out.pop();
                out.push(Node::CombineValues {
                    local_pairs,
                    local_groups: None,
                    merge,
                });
                lifted = true;
            }
            node => out.push(node),
        }
    }

    (out, lifted.then_some(OptimizationDecision::LiftedGBKCombine))
}

/* ---------- Adaptive partitions ---------- */

fn estimate_source_len(chain: &[Node]) -> Option<usize> {
    if let Some(Node::Source {
        payload, vec_ops, ..
    }) = chain.first()
    {
        vec_ops.len(payload.as_ref())
    } else {
        None
    }
}

/// About 64k rows per partition, clamped to `[cpus, 8 * cpus]`.
fn suggest_partitions(len_hint: Option<usize>) -> Option<usize> {
    let n = len_hint?;
    let target_rows_per_part = 64_000usize;
    let hw = num_cpus::get().max(2);
    Some(n.div_ceil(target_rows_per_part).clamp(hw, hw * 8))
}
