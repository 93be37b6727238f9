//! Single-shard block reads.

use crate::base::{get_first_success, CoreProcessor};
use crate::ProcessError;
use proxy_types::{build_url_with_block_query_options, BlockQueryOptions, ShardId};
use std::sync::Arc;

/// The block group path of observers.
pub const BLOCK_BY_NONCE_PATH: &str = "/block/by-nonce/";

/// The block-by-hash path of observers.
pub const BLOCK_BY_HASH_PATH: &str = "/block/by-hash/";

/// Resolves single-block requests against one shard's observers.
pub struct BlockProcessor {
	proc: Arc<dyn CoreProcessor>,
}

impl BlockProcessor {
	/// Creates a new block processor.
	pub fn new(proc: Arc<dyn CoreProcessor>) -> Self {
		Self { proc }
	}

	/// Returns the block of one shard at the given nonce, passed through
	/// verbatim.
	pub async fn get_block_by_nonce(
		&self,
		shard: ShardId,
		nonce: u64,
		options: &BlockQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_block_query_options(
			&format!("{}{}", BLOCK_BY_NONCE_PATH, nonce),
			options,
		);
		self.from_shard(shard, &path).await
	}

	/// Returns the block of one shard with the given hash, passed through
	/// verbatim.
	pub async fn get_block_by_hash(
		&self,
		shard: ShardId,
		hash: &str,
		options: &BlockQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_block_query_options(
			&format!("{}{}", BLOCK_BY_HASH_PATH, hash),
			options,
		);
		self.from_shard(shard, &path).await
	}

	async fn from_shard(
		&self,
		shard: ShardId,
		path: &str,
	) -> Result<serde_json::Value, ProcessError> {
		let observers = self.proc.observers(shard)?;
		get_first_success(self.proc.as_ref(), &observers, path).await
	}
}
