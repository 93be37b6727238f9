//! The base processor and the shared observer-traversal pattern.

use crate::ProcessError;
use async_trait::async_trait;
use proxy_forwarder::{CallOutcome, Forwarder};
use proxy_routing::{ObserversRegistry, ShardCoordinator};
use proxy_types::{Envelope, Observer, ShardId};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, trace};

/// Narrow contract the request processors depend on.
///
/// Observers are peers of equal authority; the trait only exposes routing
/// queries and raw calls, so tests can script the network behind it.
#[async_trait]
pub trait CoreProcessor: Send + Sync {
	/// Computes the shard owning the given address bytes.
	fn compute_shard_id(&self, address_bytes: &[u8]) -> Result<ShardId, ProcessError>;

	/// Returns the number of regular shards.
	fn number_of_shards(&self) -> u32;

	/// Returns every shard identifier, metachain included.
	fn shard_ids(&self) -> Vec<ShardId>;

	/// Returns the observers of one shard, in failover preference order.
	fn observers(&self, shard: ShardId) -> Result<Vec<Observer>, ProcessError>;

	/// Returns every observer in the global preference order.
	fn all_observers(&self) -> Vec<Observer>;

	/// Issues a GET against one observer.
	async fn call_get(&self, observer_url: &str, path: &str) -> CallOutcome;

	/// Issues a POST against one observer.
	async fn call_post(&self, observer_url: &str, path: &str, body: serde_json::Value)
		-> CallOutcome;
}

/// Production implementation composing the shard coordinator, the observer
/// inventory and the HTTP forwarder.
pub struct BaseProcessor {
	coordinator: ShardCoordinator,
	registry: Arc<ObserversRegistry>,
	forwarder: Arc<dyn Forwarder>,
}

impl BaseProcessor {
	/// Creates a base processor over the given collaborators.
	pub fn new(
		coordinator: ShardCoordinator,
		registry: Arc<ObserversRegistry>,
		forwarder: Arc<dyn Forwarder>,
	) -> Self {
		Self { coordinator, registry, forwarder }
	}

	fn join(observer_url: &str, path: &str) -> String {
		format!("{}{}", observer_url.trim_end_matches('/'), path)
	}
}

#[async_trait]
impl CoreProcessor for BaseProcessor {
	fn compute_shard_id(&self, address_bytes: &[u8]) -> Result<ShardId, ProcessError> {
		Ok(self.coordinator.compute_shard_id(address_bytes)?)
	}

	fn number_of_shards(&self) -> u32 {
		self.coordinator.number_of_shards()
	}

	fn shard_ids(&self) -> Vec<ShardId> {
		self.coordinator.shard_ids()
	}

	fn observers(&self, shard: ShardId) -> Result<Vec<Observer>, ProcessError> {
		Ok(self.registry.observers(shard)?)
	}

	fn all_observers(&self) -> Vec<Observer> {
		self.registry.all_observers()
	}

	async fn call_get(&self, observer_url: &str, path: &str) -> CallOutcome {
		self.forwarder.call_get(&Self::join(observer_url, path)).await
	}

	async fn call_post(
		&self,
		observer_url: &str,
		path: &str,
		body: serde_json::Value,
	) -> CallOutcome {
		self.forwarder.call_post(&Self::join(observer_url, path), &body).await
	}
}

/// Walks the candidate list with a GET until one observer answers.
///
/// `404` and `408` skip to the next candidate, any other failure is fatal
/// and surfaced verbatim, and an exhausted list reports `SendingRequest`.
pub(crate) async fn get_first_success(
	proc: &dyn CoreProcessor,
	candidates: &[Observer],
	path: &str,
) -> Result<serde_json::Value, ProcessError> {
	for observer in candidates {
		let outcome = proc.call_get(&observer.address, path).await;
		match classify(observer, path, outcome)? {
			Some(value) => return Ok(value),
			None => continue,
		}
	}

	Err(ProcessError::SendingRequest)
}

/// POST counterpart of [`get_first_success`].
pub(crate) async fn post_first_success(
	proc: &dyn CoreProcessor,
	candidates: &[Observer],
	path: &str,
	body: &serde_json::Value,
) -> Result<serde_json::Value, ProcessError> {
	for observer in candidates {
		let outcome = proc.call_post(&observer.address, path, body.clone()).await;
		match classify(observer, path, outcome)? {
			Some(value) => return Ok(value),
			None => continue,
		}
	}

	Err(ProcessError::SendingRequest)
}

fn classify(
	observer: &Observer,
	path: &str,
	outcome: CallOutcome,
) -> Result<Option<serde_json::Value>, ProcessError> {
	if outcome.is_success() {
		debug!(observer = %observer.address, path, "request resolved");
		return Ok(outcome.result.ok());
	}

	if outcome.should_skip() {
		trace!(
			observer = %observer.address,
			path,
			status = outcome.status,
			error = %outcome.error_message(),
			"skipping observer"
		);
		return Ok(None);
	}

	Err(ProcessError::Observer {
		status: outcome.status,
		message: outcome.error_message(),
	})
}

/// Decodes an enveloped observer reply into its `data` payload.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
	value: serde_json::Value,
) -> Result<T, ProcessError> {
	let envelope: Envelope<T> =
		serde_json::from_value(value).map_err(|e| ProcessError::Decode(e.to_string()))?;
	envelope.into_data().map_err(ProcessError::Response)
}
