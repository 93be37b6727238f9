//! Cross-shard block reads by round.

use crate::base::{decode_envelope, get_first_success, CoreProcessor};
use crate::ProcessError;
use proxy_types::{build_url_with_block_query_options, BlockData, BlockQueryOptions};
use std::sync::Arc;

/// The block-by-round path of observers.
pub const BLOCKS_BY_ROUND_PATH: &str = "/block/by-round/";

/// Collects the blocks every shard produced in one round.
pub struct BlocksProcessor {
	proc: Arc<dyn CoreProcessor>,
}

impl BlocksProcessor {
	/// Creates a new blocks processor.
	pub fn new(proc: Arc<dyn CoreProcessor>) -> Self {
		Self { proc }
	}

	/// Returns the blocks of the given round, one per answering shard.
	///
	/// Shards whose observers were all skipped contribute nothing; a fatal
	/// observer reply aborts the request.
	pub async fn get_blocks_by_round(
		&self,
		round: u64,
		options: &BlockQueryOptions,
	) -> Result<Vec<serde_json::Value>, ProcessError> {
		let path = build_url_with_block_query_options(
			&format!("{}{}", BLOCKS_BY_ROUND_PATH, round),
			options,
		);

		let mut blocks = Vec::new();
		for shard in self.proc.shard_ids() {
			let observers = self.proc.observers(shard)?;
			match get_first_success(self.proc.as_ref(), &observers, &path).await {
				Ok(reply) => {
					let data: BlockData = decode_envelope(reply)?;
					blocks.push(data.block);
				},
				Err(ProcessError::SendingRequest) => continue,
				Err(e) => return Err(e),
			}
		}

		Ok(blocks)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::*;
	use proxy_types::{Observer, METACHAIN_SHARD_ID};
	use serde_json::json;

	fn setup() -> (Arc<MockProcessor>, BlocksProcessor) {
		let mock = Arc::new(MockProcessor::new(2, vec![
			Observer::new("http://0a", 0),
			Observer::new("http://1x", 1),
			Observer::new("http://meta", METACHAIN_SHARD_ID),
		]));
		let processor = BlocksProcessor::new(Arc::clone(&mock) as Arc<dyn CoreProcessor>);
		(mock, processor)
	}

	fn block_reply(nonce: u64) -> serde_json::Value {
		json!({"data": {"block": {"nonce": nonce}}, "error": "", "code": "successful"})
	}

	#[tokio::test]
	async fn test_collects_one_block_per_answering_shard() {
		let (mock, processor) = setup();
		mock.stub("http://0a/block/by-round/7", ok_outcome(block_reply(70)));
		mock.stub("http://1x/block/by-round/7", ok_outcome(block_reply(71)));
		mock.stub("http://meta/block/by-round/7", ok_outcome(block_reply(72)));

		let blocks = processor
			.get_blocks_by_round(7, &BlockQueryOptions::default())
			.await
			.unwrap();
		assert_eq!(blocks.len(), 3);
		assert_eq!(blocks[0]["nonce"], 70);
		assert_eq!(blocks[2]["nonce"], 72);
	}

	#[tokio::test]
	async fn test_silent_shard_is_skipped() {
		let (mock, processor) = setup();
		mock.stub("http://0a/block/by-round/7", ok_outcome(block_reply(70)));
		// shard 1 and the metachain answer 404 (the default)

		let blocks = processor
			.get_blocks_by_round(7, &BlockQueryOptions::default())
			.await
			.unwrap();
		assert_eq!(blocks.len(), 1);
	}

	#[tokio::test]
	async fn test_fatal_reply_aborts() {
		let (mock, processor) = setup();
		mock.stub("http://0a/block/by-round/7", status_outcome(500, "boom"));

		let err = processor
			.get_blocks_by_round(7, &BlockQueryOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(err, ProcessError::Observer { status: 500, .. }));
	}
}
