//! Elasticsearch-backed indexer connector.

use crate::{IndexerError, StorageConnector};
use async_trait::async_trait;
use proxy_types::DatabaseTransaction;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;
use url::Url;

const TRANSACTIONS_INDEX: &str = "transactions";
const MAX_RESULTS: usize = 50;

/// Connector reading historical transactions from an Elasticsearch-style
/// indexer.
pub struct ElasticConnector {
	client: reqwest::Client,
	base_url: Url,
}

impl ElasticConnector {
	/// Creates a connector for the given indexer base URL.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexerError> {
		let base_url = Url::parse(base_url).map_err(|e| IndexerError::Backend(e.to_string()))?;
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| IndexerError::Backend(e.to_string()))?;
		Ok(Self { client, base_url })
	}

	async fn search(&self, index: &str, query: Value) -> Result<Value, IndexerError> {
		let url = self
			.base_url
			.join(&format!("{}/_search", index))
			.map_err(|e| IndexerError::Backend(e.to_string()))?;

		let response = self
			.client
			.post(url)
			.json(&query)
			.send()
			.await
			.map_err(|e| IndexerError::Backend(e.to_string()))?;

		if !response.status().is_success() {
			return Err(IndexerError::Backend(format!(
				"database answered with status {}",
				response.status().as_u16()
			)));
		}

		response.json().await.map_err(|e| IndexerError::Decode(e.to_string()))
	}
}

#[async_trait]
impl StorageConnector for ElasticConnector {
	async fn transactions_by_address(
		&self,
		address: &str,
	) -> Result<Vec<DatabaseTransaction>, IndexerError> {
		let query = json!({
			"size": MAX_RESULTS,
			"sort": [{"timestamp": {"order": "desc"}}],
			"query": {
				"bool": {
					"should": [
						{"match": {"sender": address}},
						{"match": {"receiver": address}}
					]
				}
			}
		});

		let body = self.search(TRANSACTIONS_INDEX, query).await?;
		convert_hits_to_transactions(&body)
	}
}

/// Converts an Elasticsearch `_search` reply into transactions.
///
/// Each hit's `_source` is the transaction body and its `_id` is the
/// transaction hash. Hits that fail to decode are skipped.
fn convert_hits_to_transactions(body: &Value) -> Result<Vec<DatabaseTransaction>, IndexerError> {
	let hits = body
		.get("hits")
		.and_then(|h| h.get("hits"))
		.and_then(Value::as_array)
		.ok_or_else(|| IndexerError::Decode("missing hits in search response".to_string()))?;

	let mut transactions = Vec::with_capacity(hits.len());
	for hit in hits {
		let Some(source) = hit.get("_source") else {
			continue;
		};
		let mut tx: DatabaseTransaction = match serde_json::from_value(source.clone()) {
			Ok(tx) => tx,
			Err(e) => {
				warn!(error = %e, "skipping unparseable indexer hit");
				continue;
			},
		};
		if let Some(id) = hit.get("_id").and_then(Value::as_str) {
			tx.hash = id.to_string();
		}
		transactions.push(tx);
	}

	Ok(transactions)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_convert_hits_stamps_hash_from_id() {
		let body = json!({
			"hits": {
				"hits": [
					{
						"_id": "aabbcc",
						"_source": {
							"nonce": 4,
							"sender": "erd1alice",
							"receiver": "erd1bob",
							"value": "100",
							"status": "success",
							"timestamp": 170000
						}
					}
				]
			}
		});

		let txs = convert_hits_to_transactions(&body).unwrap();
		assert_eq!(txs.len(), 1);
		assert_eq!(txs[0].hash, "aabbcc");
		assert_eq!(txs[0].nonce, 4);
		assert_eq!(txs[0].sender, "erd1alice");
	}

	#[test]
	fn test_convert_hits_skips_bad_sources() {
		let body = json!({
			"hits": {
				"hits": [
					{"_id": "1", "_source": {"nonce": "not a number"}},
					{"_id": "2", "_source": {"nonce": 9, "sender": "erd1alice"}}
				]
			}
		});

		let txs = convert_hits_to_transactions(&body).unwrap();
		assert_eq!(txs.len(), 1);
		assert_eq!(txs[0].hash, "2");
	}

	#[test]
	fn test_convert_missing_hits_errors() {
		let err = convert_hits_to_transactions(&json!({"took": 1})).unwrap_err();
		assert!(matches!(err, IndexerError::Decode(_)));
	}
}
