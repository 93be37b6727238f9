//! Observer records and shard identifiers.

use serde::{Deserialize, Serialize};

/// Identifier of one shard of the network.
pub type ShardId = u32;

/// Reserved identifier of the metachain shard.
pub const METACHAIN_SHARD_ID: ShardId = 0xFFFF_FFFF;

/// A backend observer node the proxy can forward requests to.
///
/// Observers are created when the inventory is loaded and replaced wholesale
/// on reload, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observer {
	/// Base URL of the observer's HTTP API.
	pub address: String,
	/// Shard this observer belongs to.
	pub shard_id: ShardId,
}

impl Observer {
	/// Creates a new observer record.
	pub fn new(address: impl Into<String>, shard_id: ShardId) -> Self {
		Self {
			address: address.into(),
			shard_id,
		}
	}

	/// Returns true for observers of the metachain shard.
	pub fn is_metachain(&self) -> bool {
		self.shard_id == METACHAIN_SHARD_ID
	}
}

/// Result of an inventory reload request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
	/// Human-readable description of what was (or was not) reloaded.
	pub description: String,
	/// Error message when the reload failed, empty otherwise.
	#[serde(default)]
	pub error: String,
	/// Whether the reload succeeded.
	pub ok: bool,
}

impl ReloadResponse {
	/// Builds a successful reload response.
	pub fn success(description: impl Into<String>) -> Self {
		Self {
			description: description.into(),
			error: String::new(),
			ok: true,
		}
	}

	/// Builds a failed reload response.
	pub fn failure(description: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			description: description.into(),
			error: error.into(),
			ok: false,
		}
	}
}
