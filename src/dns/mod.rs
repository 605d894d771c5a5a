//! DNS module.
//!
//! This module provides nameserver probing:
//! - Resolvers bound to exactly one nameserver
//! - Per-nameserver resolution, reachability and timing
//! - Aggregation of answers across nameservers
//! - Core data types

pub mod aggregator;
pub mod prober;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::ProbeAggregator;
pub use prober::NameProber;
pub use resolver::{IsolatedResolverFactory, Resolve, ResolverBinding, ResolverFactory};
pub use types::*;
