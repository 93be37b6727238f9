//! Account-scoped reads.
//!
//! Every operation here is served by the shard owning the address, so the
//! candidate list is that shard's observers and the traversal falls over
//! inside one shard only.

use crate::base::{decode_envelope, get_first_success, CoreProcessor};
use crate::ProcessError;
use proxy_indexer::StorageConnector;
use proxy_types::{
	build_url_with_account_query_options, AccountModel, AccountQueryOptions, AddressCodec,
	DatabaseTransaction, Observer, ShardId,
};
use std::sync::Arc;
use tracing::info;

/// The address group path at which observers answer.
pub const ADDRESS_PATH: &str = "/address/";

/// Resolves account requests against the owning shard's observers.
pub struct AccountProcessor {
	proc: Arc<dyn CoreProcessor>,
	codec: AddressCodec,
	connector: Arc<dyn StorageConnector>,
}

impl AccountProcessor {
	/// Creates a new account processor.
	pub fn new(
		proc: Arc<dyn CoreProcessor>,
		codec: AddressCodec,
		connector: Arc<dyn StorageConnector>,
	) -> Self {
		Self { proc, codec, connector }
	}

	/// Returns the account state together with the block it was read at.
	pub async fn get_account(
		&self,
		address: &str,
		options: &AccountQueryOptions,
	) -> Result<AccountModel, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}", ADDRESS_PATH, address),
			options,
		);
		let reply = self.from_observers(address, &path).await?;
		let model: AccountModel = decode_envelope(reply)?;
		info!(address, "account request resolved");
		Ok(model)
	}

	/// Returns the value stored under one key of the account.
	pub async fn get_value_for_key(
		&self,
		address: &str,
		key: &str,
		options: &AccountQueryOptions,
	) -> Result<String, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/key/{}", ADDRESS_PATH, address, key),
			options,
		);
		let reply = self.from_observers(address, &path).await?;
		extract_value(reply)
	}

	/// Returns all key-value pairs of the account, passed through verbatim.
	pub async fn get_key_value_pairs(
		&self,
		address: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/keys", ADDRESS_PATH, address),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns all fungible tokens held by the account.
	pub async fn get_all_esdt_tokens(
		&self,
		address: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/esdt", ADDRESS_PATH, address),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the balance data of one token of the account.
	pub async fn get_esdt_token_data(
		&self,
		address: &str,
		token: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/esdt/{}", ADDRESS_PATH, address, token),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the data of one non-fungible token instance.
	pub async fn get_esdt_nft_token_data(
		&self,
		address: &str,
		token: &str,
		nonce: u64,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/nft/{}/nonce/{}", ADDRESS_PATH, address, token, nonce),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the token identifiers for which the account holds a role.
	pub async fn get_esdts_with_role(
		&self,
		address: &str,
		role: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/esdts-with-role/{}", ADDRESS_PATH, address, role),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the token roles held by the account.
	pub async fn get_esdts_roles(
		&self,
		address: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/esdts/roles", ADDRESS_PATH, address),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the NFT identifiers registered by the account.
	pub async fn get_nft_token_ids_registered_by_address(
		&self,
		address: &str,
		options: &AccountQueryOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let path = build_url_with_account_query_options(
			&format!("{}{}/registered-nfts", ADDRESS_PATH, address),
			options,
		);
		self.from_observers(address, &path).await
	}

	/// Returns the historical transactions of the address from the external
	/// indexer. No observer is consulted.
	pub async fn get_transactions(
		&self,
		address: &str,
	) -> Result<Vec<DatabaseTransaction>, ProcessError> {
		Ok(self.connector.transactions_by_address(address).await?)
	}

	/// Computes the shard of an address locally, without any network call.
	pub fn get_shard_id_for_address(&self, address: &str) -> Result<ShardId, ProcessError> {
		let bytes = self.codec.decode(address)?;
		self.proc.compute_shard_id(&bytes)
	}

	fn observers_for_address(&self, address: &str) -> Result<Vec<Observer>, ProcessError> {
		let bytes = self.codec.decode(address)?;
		let shard = self.proc.compute_shard_id(&bytes)?;
		self.proc.observers(shard)
	}

	async fn from_observers(
		&self,
		address: &str,
		path: &str,
	) -> Result<serde_json::Value, ProcessError> {
		let observers = self.observers_for_address(address)?;
		get_first_success(self.proc.as_ref(), &observers, path).await
	}
}

/// Extracts the `value` field of a key lookup, surfacing the embedded
/// error when the observer reported one instead.
fn extract_value(reply: serde_json::Value) -> Result<String, ProcessError> {
	let data: serde_json::Value = decode_envelope(reply)?;
	match data.get("value") {
		Some(serde_json::Value::String(value)) => Ok(value.clone()),
		Some(value) => Ok(value.to_string()),
		None => Err(ProcessError::Response("unexpected response".to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::*;
	use proxy_indexer::implementations::disabled::DisabledConnector;
	use proxy_indexer::IndexerError;
	use proxy_types::Observer;
	use serde_json::json;

	fn processor_with(mock: Arc<MockProcessor>) -> AccountProcessor {
		AccountProcessor::new(mock, AddressCodec::new("erd"), Arc::new(DisabledConnector))
	}

	fn shard0_observers() -> Vec<Observer> {
		vec![
			Observer::new("http://0a", 0),
			Observer::new("http://0b", 0),
			Observer::new("http://0c", 0),
		]
	}

	fn account_reply(balance: &str) -> serde_json::Value {
		json!({
			"data": {
				"account": {"address": "erd1x", "nonce": 5, "balance": balance},
				"blockInfo": {"nonce": 100, "hash": "aa", "rootHash": "bb"}
			},
			"error": "",
			"code": "successful"
		})
	}

	#[tokio::test]
	async fn test_get_account_fails_over_past_timeouts() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);

		mock.stub(&format!("http://0a/address/{}", address), transport_outcome());
		mock.stub(&format!("http://0b/address/{}", address), ok_outcome(account_reply("7")));

		let processor = processor_with(Arc::clone(&mock));
		let model = processor
			.get_account(&address, &AccountQueryOptions::default())
			.await
			.unwrap();

		assert_eq!(model.account.balance, "7");
		// the third observer is never consulted
		assert_eq!(
			mock.calls(),
			vec![
				format!("http://0a/address/{}", address),
				format!("http://0b/address/{}", address),
			]
		);
	}

	#[tokio::test]
	async fn test_get_account_fatal_short_circuits() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);

		mock.stub(&format!("http://0a/address/{}", address), status_outcome(500, "boom"));

		let processor = processor_with(Arc::clone(&mock));
		let err = processor
			.get_account(&address, &AccountQueryOptions::default())
			.await
			.unwrap_err();

		match err {
			ProcessError::Observer { status, message } => {
				assert_eq!(status, 500);
				assert_eq!(message, "boom");
			},
			other => panic!("unexpected error: {:?}", other),
		}
		assert_eq!(mock.calls().len(), 1);
	}

	#[tokio::test]
	async fn test_get_account_exhaustion_reports_sending_request() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);
		// every observer answers 404: no stubs needed, that is the default

		let processor = processor_with(Arc::clone(&mock));
		let err = processor
			.get_account(&address, &AccountQueryOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(err, ProcessError::SendingRequest));
		assert_eq!(mock.calls().len(), 3);
	}

	#[tokio::test]
	async fn test_get_account_decorates_url_with_options() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);

		let url = format!("http://0a/address/{}?onFinalBlock=true", address);
		mock.stub(&url, ok_outcome(account_reply("1")));

		let processor = processor_with(Arc::clone(&mock));
		let options = AccountQueryOptions { on_final_block: true, ..Default::default() };
		processor.get_account(&address, &options).await.unwrap();
		assert_eq!(mock.calls(), vec![url]);
	}

	#[tokio::test]
	async fn test_get_value_for_key() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);

		mock.stub(
			&format!("http://0a/address/{}/key/aabb", address),
			ok_outcome(json!({"data": {"value": "1234"}, "error": "", "code": "successful"})),
		);

		let processor = processor_with(Arc::clone(&mock));
		let value = processor
			.get_value_for_key(&address, "aabb", &AccountQueryOptions::default())
			.await
			.unwrap();
		assert_eq!(value, "1234");
	}

	#[tokio::test]
	async fn test_get_value_for_key_surfaces_embedded_error() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 0);

		mock.stub(
			&format!("http://0a/address/{}/key/aabb", address),
			ok_outcome(json!({"data": null, "error": "trie error", "code": "internal_issue"})),
		);

		let processor = processor_with(Arc::clone(&mock));
		let err = processor
			.get_value_for_key(&address, "aabb", &AccountQueryOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(err, ProcessError::Response(message) if message == "trie error"));
	}

	#[tokio::test]
	async fn test_get_shard_id_for_address_is_local() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let codec = AddressCodec::new("erd");
		let address = address_ending_in(&codec, 3);

		let processor = processor_with(Arc::clone(&mock));
		let shard = processor.get_shard_id_for_address(&address).unwrap();
		assert_eq!(shard, 1);
		assert!(mock.calls().is_empty());
	}

	#[tokio::test]
	async fn test_get_shard_id_rejects_malformed_address() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let processor = processor_with(mock);
		assert!(matches!(
			processor.get_shard_id_for_address("garbage").unwrap_err(),
			ProcessError::Address(_)
		));
	}

	#[tokio::test]
	async fn test_get_transactions_delegates_to_connector() {
		let mock = Arc::new(MockProcessor::new(2, shard0_observers()));
		let processor = processor_with(Arc::clone(&mock));

		let err = processor.get_transactions("erd1alice").await.unwrap_err();
		assert!(matches!(err, ProcessError::Indexer(IndexerError::NotEnabled)));
		assert!(mock.calls().is_empty());
	}
}
