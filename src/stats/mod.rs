//! Per-key statistics built on the grouped-table operations.
//!
//! - [`mean_per_key`](crate::PCollection::mean_per_key)
//! - [`percentiles_distributed`](crate::PCollection::percentiles_distributed) and
//!   [`percentiles_in_memory`](crate::PCollection::percentiles_in_memory)
//! - [`top_n_by_key`](crate::PCollection::top_n_by_key) and
//!   [`global_toplist`](crate::PCollection::global_toplist)

mod averages;
mod percentiles;
pub mod quantiles;
mod toplists;

pub use quantiles::{PercentileResult, QuantileSet, rank_index, select_by_rank};
