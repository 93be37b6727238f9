//! Query-option families and their URL builders.
//!
//! Each family is a set of orthogonal flags and values. A builder appends
//! the non-default ones to an upstream path as query parameters, so a
//! default options struct leaves the path untouched.

use serde::{Deserialize, Serialize};

/// Options for single-block queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockQueryOptions {
	pub with_transactions: bool,
	pub with_logs: bool,
}

/// Options for hyperblock queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperblockQueryOptions {
	pub with_logs: bool,
}

/// Options for account-scoped queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountQueryOptions {
	pub on_final_block: bool,
	pub on_start_of_epoch: Option<u32>,
	pub block_nonce: Option<u64>,
	/// Raw hash bytes; empty means absent. Emitted as lowercase hex.
	pub block_hash: Vec<u8>,
	/// Raw root-hash bytes; empty means absent. Emitted as lowercase hex.
	pub block_root_hash: Vec<u8>,
	pub hint_epoch: Option<u32>,
}

/// Options for transaction retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQueryOptions {
	pub with_results: bool,
}

/// Options for transaction simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSimulationOptions {
	/// Defaults to true; the parameter is appended upstream only when the
	/// caller explicitly disabled the check.
	pub check_signature: bool,
}

impl Default for TransactionSimulationOptions {
	fn default() -> Self {
		Self { check_signature: true }
	}
}

/// Options for transactions-pool queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsPoolOptions {
	pub shard_id: String,
	pub sender: String,
	pub fields: String,
	pub last_nonce: bool,
	pub nonce_gaps: bool,
}

/// Incrementally appends query parameters to a path.
struct UrlBuilder {
	url: String,
	has_query: bool,
}

impl UrlBuilder {
	fn new(path: &str) -> Self {
		Self {
			url: path.to_string(),
			has_query: path.contains('?'),
		}
	}

	fn param(mut self, name: &str, value: impl AsRef<str>) -> Self {
		self.url.push(if self.has_query { '&' } else { '?' });
		self.has_query = true;
		self.url.push_str(name);
		self.url.push('=');
		self.url.push_str(value.as_ref());
		self
	}

	fn param_if(self, condition: bool, name: &str, value: impl AsRef<str>) -> Self {
		if condition {
			self.param(name, value)
		} else {
			self
		}
	}

	fn finish(self) -> String {
		self.url
	}
}

/// Decorates a block path with the non-default block options.
pub fn build_url_with_block_query_options(path: &str, options: &BlockQueryOptions) -> String {
	UrlBuilder::new(path)
		.param_if(options.with_transactions, "withTxs", "true")
		.param_if(options.with_logs, "withLogs", "true")
		.finish()
}

/// Decorates a hyperblock path with the non-default hyperblock options.
pub fn build_url_with_hyperblock_query_options(
	path: &str,
	options: &HyperblockQueryOptions,
) -> String {
	UrlBuilder::new(path)
		.param_if(options.with_logs, "withLogs", "true")
		.finish()
}

/// Decorates an account path with the non-default account options.
///
/// Hash-valued options are emitted as lowercase hex.
pub fn build_url_with_account_query_options(path: &str, options: &AccountQueryOptions) -> String {
	let mut builder = UrlBuilder::new(path).param_if(options.on_final_block, "onFinalBlock", "true");
	if let Some(epoch) = options.on_start_of_epoch {
		builder = builder.param("onStartOfEpoch", epoch.to_string());
	}
	if let Some(nonce) = options.block_nonce {
		builder = builder.param("blockNonce", nonce.to_string());
	}
	if !options.block_hash.is_empty() {
		builder = builder.param("blockHash", hex::encode(&options.block_hash));
	}
	if !options.block_root_hash.is_empty() {
		builder = builder.param("blockRootHash", hex::encode(&options.block_root_hash));
	}
	if let Some(epoch) = options.hint_epoch {
		builder = builder.param("hintEpoch", epoch.to_string());
	}
	builder.finish()
}

/// Decorates a transaction path with the non-default transaction options.
pub fn build_url_with_transaction_query_options(
	path: &str,
	options: &TransactionQueryOptions,
) -> String {
	UrlBuilder::new(path)
		.param_if(options.with_results, "withResults", "true")
		.finish()
}

/// Decorates a simulation path. `checkSignature` defaults to true upstream,
/// so it is appended only when explicitly disabled.
pub fn build_url_with_simulation_options(
	path: &str,
	options: &TransactionSimulationOptions,
) -> String {
	UrlBuilder::new(path)
		.param_if(!options.check_signature, "checkSignature", "false")
		.finish()
}

/// Decorates a transactions-pool path with the non-default pool options.
pub fn build_url_with_pool_options(path: &str, options: &TransactionsPoolOptions) -> String {
	UrlBuilder::new(path)
		.param_if(!options.shard_id.is_empty(), "shard-id", &options.shard_id)
		.param_if(!options.sender.is_empty(), "by-sender", &options.sender)
		.param_if(!options.fields.is_empty(), "fields", &options.fields)
		.param_if(options.last_nonce, "last-nonce", "true")
		.param_if(options.nonce_gaps, "nonce-gaps", "true")
		.finish()
}
