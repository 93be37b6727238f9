//! Block and hyperblock reply models.
//!
//! Block bodies are passed through untouched; the proxy only needs the
//! envelope around them and the `data` shapes it merges itself.

use serde::Deserialize;

/// `data` payload of an observer reply to `/block/by-round/{round}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
	pub block: serde_json::Value,
}
