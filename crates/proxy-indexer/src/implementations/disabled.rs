//! Connector used when no indexer is configured.

use crate::{IndexerError, StorageConnector};
use async_trait::async_trait;
use proxy_types::DatabaseTransaction;

/// Answers every read with a typed "not enabled" error.
#[derive(Debug, Default)]
pub struct DisabledConnector;

#[async_trait]
impl StorageConnector for DisabledConnector {
	async fn transactions_by_address(
		&self,
		_address: &str,
	) -> Result<Vec<DatabaseTransaction>, IndexerError> {
		Err(IndexerError::NotEnabled)
	}
}
