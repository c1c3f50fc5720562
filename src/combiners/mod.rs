//! Built-in combiners for `combine_values` and `combine_values_lifted`.
//!
//! - [`Count`](crate::Count): number of values per key.
//! - [`Mean`]: arithmetic mean as `f64` of any [`ToF64`] value.
//!
//! Both implement [`LiftableCombiner`](crate::LiftableCombiner), so
//! `group_by_key().combine_values_lifted(..)` plans as a single combine.

mod mean;

pub use mean::{Mean, ToF64};
