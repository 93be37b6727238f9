//! Request-routing module for the shard-proxy gateway.
//!
//! This module answers the two questions every forwarded request poses:
//! which shard owns an address, and which backend observers serve that
//! shard. The shard coordinator is a pure function of the address bytes;
//! the observer inventory is the only piece of shared mutable state in the
//! proxy and is swapped atomically on reload.

mod observers;
mod shard;

pub use observers::{ConfigFileSource, ObserverSource, ObserversRegistry, StaticSource};
pub use shard::ShardCoordinator;

use thiserror::Error;

/// Errors that can occur while routing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
	/// The address bytes were empty or otherwise unusable.
	#[error("invalid address bytes")]
	BadAddress,
	/// The shard count is invalid.
	#[error("the number of shards must be greater than zero")]
	InvalidShardCount,
	/// No observer is configured for the requested shard.
	#[error("no observer available for shard {0}")]
	MissingObserver(u32),
	/// The inventory source could not be read.
	#[error("cannot load observers: {0}")]
	SourceUnavailable(String),
}
