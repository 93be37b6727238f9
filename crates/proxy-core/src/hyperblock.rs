//! Hyperblock reads from the metachain.

use crate::base::{get_first_success, CoreProcessor};
use crate::ProcessError;
use proxy_types::{
	build_url_with_hyperblock_query_options, HyperblockQueryOptions, METACHAIN_SHARD_ID,
};
use std::sync::Arc;

/// The hyperblock-by-nonce path of metachain observers.
pub const HYPERBLOCK_BY_NONCE_PATH: &str = "/hyperblock/by-nonce/";

/// The hyperblock-by-hash path of metachain observers.
pub const HYPERBLOCK_BY_HASH_PATH: &str = "/hyperblock/by-hash/";

/// Resolves hyperblock requests against the metachain observers.
pub struct HyperblockProcessor {
	proc: Arc<dyn CoreProcessor>,
}

impl HyperblockProcessor {
	/// Creates a new hyperblock processor.
	pub fn new(proc: Arc<dyn CoreProcessor>) -> Self {
		Self { proc }
	}

	/// Returns the hyperblock at the given nonce, passed through verbatim.
	pub async fn get_hyperblock_by_nonce(
		&self,
		nonce: u64,
		options: &HyperblockQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_hyperblock_query_options(
			&format!("{}{}", HYPERBLOCK_BY_NONCE_PATH, nonce),
			options,
		);
		self.from_metachain(&path).await
	}

	/// Returns the hyperblock with the given hash, passed through verbatim.
	pub async fn get_hyperblock_by_hash(
		&self,
		hash: &str,
		options: &HyperblockQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_hyperblock_query_options(
			&format!("{}{}", HYPERBLOCK_BY_HASH_PATH, hash),
			options,
		);
		self.from_metachain(&path).await
	}

	async fn from_metachain(&self, path: &str) -> Result<serde_json::Value, ProcessError> {
		let observers = self.proc.observers(METACHAIN_SHARD_ID)?;
		get_first_success(self.proc.as_ref(), &observers, path).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::*;
	use proxy_types::Observer;
	use serde_json::json;

	fn setup() -> (Arc<MockProcessor>, HyperblockProcessor) {
		let mock = Arc::new(MockProcessor::new(2, vec![
			Observer::new("http://0a", 0),
			Observer::new("http://meta", METACHAIN_SHARD_ID),
		]));
		let processor = HyperblockProcessor::new(Arc::clone(&mock) as Arc<dyn CoreProcessor>);
		(mock, processor)
	}

	#[tokio::test]
	async fn test_hyperblock_is_read_from_metachain() {
		let (mock, processor) = setup();
		let reply = json!({"data": {"hyperblock": {"nonce": 4}}, "error": "", "code": "successful"});
		mock.stub("http://meta/hyperblock/by-nonce/4", ok_outcome(reply.clone()));

		let hyperblock = processor
			.get_hyperblock_by_nonce(4, &HyperblockQueryOptions::default())
			.await
			.unwrap();
		assert_eq!(hyperblock, reply);
		assert!(mock.calls().iter().all(|url| url.starts_with("http://meta")));
	}

	#[tokio::test]
	async fn test_hyperblock_by_hash_decorates_url() {
		let (mock, processor) = setup();
		let reply = json!({"data": {"hyperblock": {}}, "error": "", "code": "successful"});
		mock.stub("http://meta/hyperblock/by-hash/aabb?withLogs=true", ok_outcome(reply));

		processor
			.get_hyperblock_by_hash("aabb", &HyperblockQueryOptions { with_logs: true })
			.await
			.unwrap();
	}
}
