//! Transaction models for submission, retrieval and pool inspection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status string reported by observers for a transaction. The proxy treats
/// it as opaque.
pub type TransactionStatus = String;

/// A client-submitted transaction, forwarded verbatim to observers.
///
/// `index` is populated transiently while routing a bulk submission (it
/// holds the position the transaction had in the client's array) and is
/// never transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub value: String,
	pub receiver: String,
	pub sender: String,
	#[serde(default, skip_serializing_if = "is_zero")]
	pub gas_price: u64,
	#[serde(default, skip_serializing_if = "is_zero")]
	pub gas_limit: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
	#[serde(skip)]
	pub index: usize,
}

fn is_zero(value: &u64) -> bool {
	*value == 0
}

/// A transaction as returned by an observer's `/transaction/{hash}`.
///
/// Fields the proxy does not interpret are carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransaction {
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub value: String,
	#[serde(default)]
	pub receiver: String,
	#[serde(default)]
	pub sender: String,
	#[serde(default)]
	pub gas_price: u64,
	#[serde(default)]
	pub gas_limit: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
	#[serde(default)]
	pub status: TransactionStatus,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `data` payload of an observer reply to `/transaction/{hash}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
	pub transaction: ApiTransaction,
}

/// `data` payload of an observer reply to `/transaction/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionData {
	pub tx_hash: String,
}

/// `data` payload of an observer reply to `/transaction/send-multiple`.
///
/// `txs_hashes` is keyed by the position each transaction had in the
/// submitted group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleTransactionsData {
	#[serde(default)]
	pub num_of_txs: u64,
	#[serde(default)]
	pub txs_hashes: HashMap<usize, String>,
}

/// `data` payload of an observer reply to `/transaction/cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCostData {
	#[serde(default)]
	pub tx_cost: u64,
}

/// Pooled transactions of one or more shards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPool {
	#[serde(default)]
	pub regular_transactions: Vec<serde_json::Value>,
	#[serde(default)]
	pub smart_contract_results: Vec<serde_json::Value>,
	#[serde(default)]
	pub rewards: Vec<serde_json::Value>,
}

impl TransactionsPool {
	/// Appends the content of another pool snapshot.
	pub fn merge(&mut self, other: TransactionsPool) {
		self.regular_transactions.extend(other.regular_transactions);
		self.smart_contract_results.extend(other.smart_contract_results);
		self.rewards.extend(other.rewards);
	}
}

/// `data` payload of an observer reply to `/transaction/pool`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPoolData {
	pub tx_pool: TransactionsPool,
}

/// Pooled transactions of a single sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionsPoolForSender {
	#[serde(default)]
	pub sender: String,
	#[serde(default)]
	pub transactions: Vec<serde_json::Value>,
}

/// `data` payload of a sender-scoped `/transaction/pool` reply.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolForSenderData {
	pub tx_pool: TransactionsPoolForSender,
}

/// `data` payload of a `last-nonce` pool query.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolNonceData {
	#[serde(default)]
	pub nonce: u64,
}

/// A gap in the pooled nonce sequence of a sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceGap {
	pub from: u64,
	pub to: u64,
}

/// Nonce gaps in the pool for a single sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionsPoolNonceGaps {
	#[serde(default)]
	pub sender: String,
	#[serde(default)]
	pub gaps: Vec<NonceGap>,
}

/// `data` payload of a `nonce-gaps` pool query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolNonceGapsData {
	pub nonce_gaps: TransactionsPoolNonceGaps,
}

/// A historical transaction read from the external indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseTransaction {
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub value: String,
	#[serde(default)]
	pub receiver: String,
	#[serde(default)]
	pub sender: String,
	#[serde(default)]
	pub gas_price: u64,
	#[serde(default)]
	pub gas_limit: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub timestamp: u64,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transaction_index_is_not_serialized() {
		let tx = Transaction {
			nonce: 1,
			value: "100".to_string(),
			receiver: "erd1receiver".to_string(),
			sender: "erd1sender".to_string(),
			index: 3,
			..Default::default()
		};

		let json = serde_json::to_value(&tx).unwrap();
		assert!(json.get("index").is_none());
		assert_eq!(json["nonce"], 1);
		assert_eq!(json["receiver"], "erd1receiver");
	}

	#[test]
	fn test_multiple_transactions_data_integer_keys() {
		let data: MultipleTransactionsData = serde_json::from_str(
			r#"{"numOfTxs": 2, "txsHashes": {"0": "aa", "1": "bb"}}"#,
		)
		.unwrap();
		assert_eq!(data.num_of_txs, 2);
		assert_eq!(data.txs_hashes[&0], "aa");
		assert_eq!(data.txs_hashes[&1], "bb");
	}

	#[test]
	fn test_api_transaction_keeps_unknown_fields() {
		let tx: ApiTransaction = serde_json::from_str(
			r#"{"sender": "a", "receiver": "b", "status": "pending", "miniblockHash": "cc"}"#,
		)
		.unwrap();
		assert_eq!(tx.status, "pending");
		assert_eq!(tx.extra["miniblockHash"], "cc");
	}
}
