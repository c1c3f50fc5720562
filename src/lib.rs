//! # Rankflow
//!
//! Per-key **order statistics and rankings** over key-grouped tables, on a small
//! in-process batch engine in the style of Apache Beam / Crunch.
//!
//! A table is a [`PCollection<(K, V)>`]. Building on it only records a graph;
//! nothing runs until a `collect_*` call hands the plan to the [`Runner`].
//!
//! ## Statistics
//!
//! - [`mean_per_key`](PCollection::mean_per_key): arithmetic mean through the
//!   [`Mean`] combiner, pre-aggregated per partition.
//! - [`percentiles_distributed`](PCollection::percentiles_distributed):
//!   nearest-rank percentiles through count, join and secondary sort. No group
//!   is ever buffered whole.
//! - [`percentiles_in_memory`](PCollection::percentiles_in_memory): the same
//!   results by sorting each group in memory.
//! - [`top_n_by_key`](PCollection::top_n_by_key): the `n` most frequent values
//!   of every key.
//! - [`global_toplist`](PCollection::global_toplist): every distinct element by
//!   descending frequency.
//!
//! ```
//! use rankflow::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let p = Pipeline::default();
//! let latencies = from_vec(&p, vec![
//!     ("api".to_string(), 12u32),
//!     ("api".to_string(), 40),
//!     ("api".to_string(), 15),
//!     ("db".to_string(), 3),
//! ]);
//!
//! let p50 = latencies.percentiles_distributed(&[0.5])?;
//! let mut out = p50.collect_par(None, None)?;
//! out.sort_by(|a, b| a.0.cmp(&b.0));
//! assert_eq!(out[0].1.get(0.5), Some(&15));
//! assert_eq!(out[1].1.count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Grouped-table operations
//!
//! - stateless: [`map`](PCollection::map), [`filter`](PCollection::filter),
//!   [`flat_map`](PCollection::flat_map), [`map_values`](PCollection::map_values),
//!   [`keys`](PCollection::keys), [`values`](PCollection::values),
//!   [`swap_kv`](PCollection::swap_kv), [`negate_counts`](PCollection::negate_counts)
//! - shuffles: [`group_by_key`](PCollection::group_by_key),
//!   [`combine_values`](PCollection::combine_values),
//!   [`count_per_element`](PCollection::count_per_element),
//!   [`join_inner`](PCollection::join_inner),
//!   [`sort_and_apply`](PCollection::sort_and_apply),
//!   [`sort_globally_by_key`](PCollection::sort_globally_by_key)
//!
//! ## Execution
//!
//! - [`collect_seq`](PCollection::collect_seq): one partition, current thread.
//! - [`collect_par`](PCollection::collect_par): partitioned on rayon.
//!
//! Both modes return the same rows. Row order is fixed for a given input and
//! mode; use the `collect_*_sorted` helpers when comparing across modes.
//!
//! ## Module overview
//!
//! - [`collection`]: `PCollection`, combiner traits
//! - [`combiners`]: built-in combiners
//! - [`stats`]: quantile requests, percentile results, rank selection
//! - [`planner`] / [`runner`]: plan building, optimization and execution
//! - [`metrics`] (feature `metrics`): run counters
//! - [`testing`]: assertions for pipeline outputs

pub mod collection;
pub mod combiners;
pub mod error;
pub mod helpers;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod node;
pub mod node_id;
pub mod pipeline;
pub mod planner;
pub mod runner;
pub mod shuffle;
pub mod stats;
pub mod testing;
pub mod type_token;
pub mod utils;

pub use collection::{CombineFn, Count, LiftableCombiner, PCollection, RFBound, from_iter, from_vec};
pub use combiners::{Mean, ToF64};
pub use error::PlanError;
pub use node_id::NodeId;
pub use pipeline::Pipeline;
pub use runner::{ExecMode, Runner};
pub use shuffle::{SortedGroup, StableMap};
pub use stats::{PercentileResult, QuantileSet, rank_index, select_by_rank};
pub use type_token::Partition;
pub use utils::OrdF64;
