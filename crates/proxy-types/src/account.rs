//! Account models returned by observers.

use serde::{Deserialize, Serialize};

/// On-chain account state as reported by an observer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	#[serde(default)]
	pub address: String,
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub balance: String,
	#[serde(default)]
	pub username: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub developer_reward: Option<String>,
}

/// Coordinates of the block an account state was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub root_hash: String,
}

/// Account state together with the block it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountModel {
	pub account: Account,
	#[serde(default)]
	pub block_info: BlockInfo,
}
