//! External indexer read path for the shard-proxy gateway.
//!
//! Observers only answer about live state; historical transactions by
//! address come from a separate indexer database. This module provides the
//! narrow connector contract the account processor depends on, plus its
//! implementations.

use async_trait::async_trait;
use proxy_types::DatabaseTransaction;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod disabled;
	pub mod elastic;
}

/// Errors that can occur while reading from the indexer.
#[derive(Debug, Clone, Error)]
pub enum IndexerError {
	/// No indexer is configured for this proxy instance.
	#[error("no connection to the external database")]
	NotEnabled,
	/// The indexer could not be reached or answered with a failure.
	#[error("database request failed: {0}")]
	Backend(String),
	/// The indexer reply does not have the expected shape.
	#[error("cannot decode database response: {0}")]
	Decode(String),
}

/// Read-only contract over the external indexer.
#[async_trait]
pub trait StorageConnector: Send + Sync {
	/// Returns the historical transactions where the address appears as
	/// sender or receiver.
	async fn transactions_by_address(
		&self,
		address: &str,
	) -> Result<Vec<DatabaseTransaction>, IndexerError>;
}
