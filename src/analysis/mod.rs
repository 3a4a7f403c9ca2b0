//! Aggregation modules.
//!
//! Cell coercion lives in `parse`; the grouping operations that build the
//! summary tables live in `aggregator`.

pub mod aggregator;
pub mod parse;

pub use aggregator::*;
