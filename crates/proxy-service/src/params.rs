//! URL-parameter parsing for the client routes.
//!
//! The grammar is strict: booleans are exactly `"true"` or `"false"`,
//! unsigned integers must fit their width, and hex parameters must be
//! even-length lowercase hex. Absent parameters take their defaults.

use proxy_types::{
	AccountQueryOptions, BlockQueryOptions, HyperblockQueryOptions, TransactionQueryOptions,
	TransactionSimulationOptions, TransactionsPoolOptions,
};
use std::collections::HashMap;
use thiserror::Error;

/// A query map as extracted by axum.
pub type QueryMap = HashMap<String, String>;

/// Errors produced by the strict parameter grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
	#[error("invalid value for parameter '{0}': expected 'true' or 'false'")]
	InvalidBool(String),
	#[error("invalid unsigned integer for parameter '{0}'")]
	InvalidUint(String),
	#[error("invalid hex string for parameter '{0}'")]
	InvalidHex(String),
}

/// Parses a boolean parameter; absent or empty means false.
pub fn parse_bool_param(query: &QueryMap, name: &str) -> Result<bool, ParamError> {
	match query.get(name).map(String::as_str) {
		None | Some("") => Ok(false),
		Some("true") => Ok(true),
		Some("false") => Ok(false),
		Some(_) => Err(ParamError::InvalidBool(name.to_string())),
	}
}

/// Parses an optional u32 parameter.
pub fn parse_u32_param(query: &QueryMap, name: &str) -> Result<Option<u32>, ParamError> {
	match query.get(name).map(String::as_str) {
		None | Some("") => Ok(None),
		Some(raw) => raw
			.parse::<u32>()
			.map(Some)
			.map_err(|_| ParamError::InvalidUint(name.to_string())),
	}
}

/// Parses an optional u64 parameter.
pub fn parse_u64_param(query: &QueryMap, name: &str) -> Result<Option<u64>, ParamError> {
	match query.get(name).map(String::as_str) {
		None | Some("") => Ok(None),
		Some(raw) => raw
			.parse::<u64>()
			.map(Some)
			.map_err(|_| ParamError::InvalidUint(name.to_string())),
	}
}

/// Parses a hex-bytes parameter; absent or empty is an empty byte string,
/// anything else must be even-length lowercase hex.
pub fn parse_hex_bytes_param(query: &QueryMap, name: &str) -> Result<Vec<u8>, ParamError> {
	let raw = match query.get(name).map(String::as_str) {
		None | Some("") => return Ok(Vec::new()),
		Some(raw) => raw,
	};

	if raw.chars().any(|c| c.is_ascii_uppercase()) {
		return Err(ParamError::InvalidHex(name.to_string()));
	}

	hex::decode(raw).map_err(|_| ParamError::InvalidHex(name.to_string()))
}

/// Returns a string parameter, empty when absent.
pub fn parse_string_param(query: &QueryMap, name: &str) -> String {
	query.get(name).cloned().unwrap_or_default()
}

/// Parses the block query-option family.
pub fn parse_block_query_options(query: &QueryMap) -> Result<BlockQueryOptions, ParamError> {
	Ok(BlockQueryOptions {
		with_transactions: parse_bool_param(query, "withTxs")?,
		with_logs: parse_bool_param(query, "withLogs")?,
	})
}

/// Parses the hyperblock query-option family.
pub fn parse_hyperblock_query_options(
	query: &QueryMap,
) -> Result<HyperblockQueryOptions, ParamError> {
	Ok(HyperblockQueryOptions { with_logs: parse_bool_param(query, "withLogs")? })
}

/// Parses the account query-option family.
pub fn parse_account_query_options(query: &QueryMap) -> Result<AccountQueryOptions, ParamError> {
	Ok(AccountQueryOptions {
		on_final_block: parse_bool_param(query, "onFinalBlock")?,
		on_start_of_epoch: parse_u32_param(query, "onStartOfEpoch")?,
		block_nonce: parse_u64_param(query, "blockNonce")?,
		block_hash: parse_hex_bytes_param(query, "blockHash")?,
		block_root_hash: parse_hex_bytes_param(query, "blockRootHash")?,
		hint_epoch: parse_u32_param(query, "hintEpoch")?,
	})
}

/// Parses the transaction query-option family.
pub fn parse_transaction_query_options(
	query: &QueryMap,
) -> Result<TransactionQueryOptions, ParamError> {
	Ok(TransactionQueryOptions { with_results: parse_bool_param(query, "withResults")? })
}

/// Parses the simulation option family. `checkSignature` defaults to true
/// when absent.
pub fn parse_transaction_simulation_options(
	query: &QueryMap,
) -> Result<TransactionSimulationOptions, ParamError> {
	let check_signature = match query.get("checkSignature").map(String::as_str) {
		None | Some("") => true,
		Some("true") => true,
		Some("false") => false,
		Some(_) => return Err(ParamError::InvalidBool("checkSignature".to_string())),
	};
	Ok(TransactionSimulationOptions { check_signature })
}

/// Parses the transactions-pool option family.
pub fn parse_transactions_pool_options(
	query: &QueryMap,
) -> Result<TransactionsPoolOptions, ParamError> {
	Ok(TransactionsPoolOptions {
		shard_id: parse_string_param(query, "shard-id"),
		sender: parse_string_param(query, "by-sender"),
		fields: parse_string_param(query, "fields"),
		last_nonce: parse_bool_param(query, "last-nonce")?,
		nonce_gaps: parse_bool_param(query, "nonce-gaps")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn query(raw: &str) -> QueryMap {
		raw.split('&')
			.filter(|pair| !pair.is_empty())
			.map(|pair| match pair.split_once('=') {
				Some((key, value)) => (key.to_string(), value.to_string()),
				None => (pair.to_string(), String::new()),
			})
			.collect()
	}

	#[test]
	fn test_parse_bool_param() {
		let q = query("a=true&b=false&c=foobar&d");

		assert!(parse_bool_param(&q, "a").unwrap());
		assert!(!parse_bool_param(&q, "b").unwrap());
		assert!(parse_bool_param(&q, "c").is_err());
		assert!(!parse_bool_param(&q, "d").unwrap());
		assert!(!parse_bool_param(&q, "e").unwrap());
	}

	#[test]
	fn test_parse_u32_param() {
		let q = query("a=7&b=0&c=foobar&d=-1&e=12345678987654321");

		assert_eq!(parse_u32_param(&q, "a").unwrap(), Some(7));
		assert_eq!(parse_u32_param(&q, "b").unwrap(), Some(0));
		assert!(parse_u32_param(&q, "c").is_err());
		assert!(parse_u32_param(&q, "d").is_err());
		// overflows a u32
		assert!(parse_u32_param(&q, "e").is_err());
		assert_eq!(parse_u32_param(&q, "missing").unwrap(), None);
	}

	#[test]
	fn test_parse_u64_param() {
		let q = query("a=7&c=foobar&d=-1&e=12345678987654321");

		assert_eq!(parse_u64_param(&q, "a").unwrap(), Some(7));
		assert!(parse_u64_param(&q, "c").is_err());
		assert!(parse_u64_param(&q, "d").is_err());
		assert_eq!(parse_u64_param(&q, "e").unwrap(), Some(12345678987654321));
	}

	#[test]
	fn test_parse_hex_bytes_param() {
		let q = query("a=aaaa&b=test&c&d=AAAA&e=abc");

		assert_eq!(parse_hex_bytes_param(&q, "a").unwrap(), vec![0xaa, 0xaa]);
		assert!(parse_hex_bytes_param(&q, "b").is_err());
		assert_eq!(parse_hex_bytes_param(&q, "c").unwrap(), Vec::<u8>::new());
		// uppercase hex is rejected
		assert!(parse_hex_bytes_param(&q, "d").is_err());
		// odd length is rejected
		assert!(parse_hex_bytes_param(&q, "e").is_err());
		assert_eq!(parse_hex_bytes_param(&q, "missing").unwrap(), Vec::<u8>::new());
	}

	#[test]
	fn test_parse_block_query_options() {
		let options = parse_block_query_options(&query("withTxs=true&withLogs=true")).unwrap();
		assert_eq!(options, BlockQueryOptions { with_transactions: true, with_logs: true });

		let options = parse_block_query_options(&query("withTxs=true")).unwrap();
		assert_eq!(options, BlockQueryOptions { with_transactions: true, with_logs: false });

		assert!(parse_block_query_options(&query("withTxs=foobar")).is_err());
	}

	#[test]
	fn test_parse_hyperblock_query_options() {
		let options = parse_hyperblock_query_options(&query("withLogs=true")).unwrap();
		assert_eq!(options, HyperblockQueryOptions { with_logs: true });

		let options = parse_hyperblock_query_options(&query("")).unwrap();
		assert_eq!(options, HyperblockQueryOptions::default());

		assert!(parse_hyperblock_query_options(&query("withLogs=foobar")).is_err());
	}

	#[test]
	fn test_parse_account_query_options() {
		let options = parse_account_query_options(&query("onFinalBlock=true")).unwrap();
		assert_eq!(
			options,
			AccountQueryOptions { on_final_block: true, ..Default::default() }
		);

		let options = parse_account_query_options(&query("")).unwrap();
		assert_eq!(options, AccountQueryOptions::default());

		let options =
			parse_account_query_options(&query("blockNonce=42&blockHash=abba")).unwrap();
		assert_eq!(options.block_nonce, Some(42));
		assert_eq!(options.block_hash, vec![0xab, 0xba]);

		assert!(parse_account_query_options(&query("onFinalBlock=foobar")).is_err());
	}

	#[test]
	fn test_parse_transaction_query_options() {
		let options = parse_transaction_query_options(&query("withResults=true")).unwrap();
		assert_eq!(options, TransactionQueryOptions { with_results: true });

		let options = parse_transaction_query_options(&query("")).unwrap();
		assert_eq!(options, TransactionQueryOptions::default());

		assert!(parse_transaction_query_options(&query("withResults=foobar")).is_err());
	}

	#[test]
	fn test_parse_transaction_simulation_options() {
		let options =
			parse_transaction_simulation_options(&query("checkSignature=false")).unwrap();
		assert!(!options.check_signature);

		// absent means enabled
		let options = parse_transaction_simulation_options(&query("")).unwrap();
		assert!(options.check_signature);

		assert!(parse_transaction_simulation_options(&query("checkSignature=foobar")).is_err());
	}

	#[test]
	fn test_parse_transactions_pool_options() {
		let options = parse_transactions_pool_options(&query("")).unwrap();
		assert_eq!(options, TransactionsPoolOptions::default());

		let options = parse_transactions_pool_options(&query(
			"by-sender=some_sender&fields=sender,receiver&last-nonce=true&nonce-gaps=true&shard-id=333",
		))
		.unwrap();
		assert_eq!(
			options,
			TransactionsPoolOptions {
				shard_id: "333".to_string(),
				sender: "some_sender".to_string(),
				fields: "sender,receiver".to_string(),
				last_nonce: true,
				nonce_gaps: true,
			}
		);
	}
}
