//! Request processors for the shard-proxy gateway.
//!
//! This module composes the shard coordinator, the observer inventory and
//! the HTTP forwarder into the processors behind every client route:
//! account reads, transaction dispatch and status resolution, and block
//! retrieval. All of them resolve a request through the same three-outcome
//! walk over an ordered observer list.

use proxy_indexer::IndexerError;
use proxy_routing::RoutingError;
use proxy_types::AddressError;
use thiserror::Error;

/// Account-scoped reads.
pub mod account;
/// The base processor composing routing and forwarding.
pub mod base;
/// Single-shard block reads.
pub mod block;
/// Cross-shard block reads by round.
pub mod blocks;
/// Hyperblock reads from the metachain.
pub mod hyperblock;
/// Transaction dispatch, retrieval and status resolution.
pub mod transaction;

pub use account::AccountProcessor;
pub use base::{BaseProcessor, CoreProcessor};
pub use block::BlockProcessor;
pub use blocks::BlocksProcessor;
pub use hyperblock::HyperblockProcessor;
pub use transaction::TransactionProcessor;

/// Errors that can occur while processing a client request.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
	/// The sender address cannot be decoded.
	#[error("invalid sender address")]
	InvalidSenderAddress,
	/// A submitted transaction carries undecodable fields.
	#[error("{message}: {reason}")]
	InvalidTxFields { message: String, reason: String },
	/// An address failed to decode.
	#[error(transparent)]
	Address(#[from] AddressError),
	/// The request cannot be routed to a shard or observer.
	#[error(transparent)]
	Routing(#[from] RoutingError),
	/// The external indexer failed.
	#[error(transparent)]
	Indexer(#[from] IndexerError),
	/// Every candidate observer was tried without an answer.
	#[error("sending the request to observers failed")]
	SendingRequest,
	/// No observer knows the requested transaction.
	#[error("transaction not found")]
	TransactionNotFound,
	/// A bulk submission contained no valid transaction.
	#[error("no valid transaction to send")]
	NoValidTransactionToSend,
	/// No faucet collaborator is wired into this proxy instance.
	#[error("the faucet is not enabled")]
	FaucetNotEnabled,
	/// An observer answered with a fatal status, surfaced verbatim.
	#[error("{message}")]
	Observer { status: u16, message: String },
	/// An observer reply does not have the expected shape.
	#[error("cannot decode observer response: {0}")]
	Decode(String),
	/// An observer embedded an error inside a successful reply.
	#[error("{0}")]
	Response(String),
}

#[cfg(test)]
pub(crate) mod testing {
	use async_trait::async_trait;
	use parking_lot::Mutex;
	use proxy_forwarder::{CallOutcome, ForwardError};
	use proxy_types::{AddressCodec, Observer, ShardId, METACHAIN_SHARD_ID, PUBKEY_LENGTH};
	use std::collections::{HashMap, VecDeque};

	use crate::base::CoreProcessor;
	use crate::ProcessError;

	/// Scripted stand-in for the base processor, keyed by full URL.
	pub struct MockProcessor {
		num_shards: u32,
		observers: HashMap<ShardId, Vec<Observer>>,
		responses: Mutex<HashMap<String, VecDeque<CallOutcome>>>,
		pub calls: Mutex<Vec<String>>,
		pub bodies: Mutex<Vec<(String, serde_json::Value)>>,
	}

	impl MockProcessor {
		pub fn new(num_shards: u32, observers: Vec<Observer>) -> Self {
			let mut by_shard: HashMap<ShardId, Vec<Observer>> = HashMap::new();
			for observer in observers {
				by_shard.entry(observer.shard_id).or_default().push(observer);
			}
			Self {
				num_shards,
				observers: by_shard,
				responses: Mutex::new(HashMap::new()),
				calls: Mutex::new(Vec::new()),
				bodies: Mutex::new(Vec::new()),
			}
		}

		/// Queues an outcome for one exact URL; outcomes are consumed in
		/// FIFO order.
		pub fn stub(&self, url: &str, outcome: CallOutcome) {
			self.responses.lock().entry(url.to_string()).or_default().push_back(outcome);
		}

		pub fn calls(&self) -> Vec<String> {
			self.calls.lock().clone()
		}

		fn next_outcome(&self, url: &str) -> CallOutcome {
			self.calls.lock().push(url.to_string());
			self.responses
				.lock()
				.get_mut(url)
				.and_then(VecDeque::pop_front)
				.unwrap_or_else(|| not_found())
		}
	}

	#[async_trait]
	impl CoreProcessor for MockProcessor {
		fn compute_shard_id(&self, address_bytes: &[u8]) -> Result<ShardId, ProcessError> {
			if address_bytes.is_empty() {
				return Err(proxy_routing::RoutingError::BadAddress.into());
			}
			Ok(u32::from(*address_bytes.last().unwrap()) % self.num_shards)
		}

		fn number_of_shards(&self) -> u32 {
			self.num_shards
		}

		fn shard_ids(&self) -> Vec<ShardId> {
			let mut ids: Vec<ShardId> = (0..self.num_shards).collect();
			ids.push(METACHAIN_SHARD_ID);
			ids
		}

		fn observers(&self, shard: ShardId) -> Result<Vec<Observer>, ProcessError> {
			self.observers
				.get(&shard)
				.cloned()
				.ok_or_else(|| proxy_routing::RoutingError::MissingObserver(shard).into())
		}

		fn all_observers(&self) -> Vec<Observer> {
			let mut all = Vec::new();
			let mut shards: Vec<&ShardId> = self.observers.keys().collect();
			shards.sort();
			for shard in shards {
				all.extend(self.observers[shard].clone());
			}
			all
		}

		async fn call_get(&self, observer_url: &str, path: &str) -> CallOutcome {
			self.next_outcome(&format!("{}{}", observer_url, path))
		}

		async fn call_post(
			&self,
			observer_url: &str,
			path: &str,
			body: serde_json::Value,
		) -> CallOutcome {
			let url = format!("{}{}", observer_url, path);
			self.bodies.lock().push((url.clone(), body));
			self.next_outcome(&url)
		}
	}

	pub fn ok_outcome(value: serde_json::Value) -> CallOutcome {
		CallOutcome { status: 200, result: Ok(value) }
	}

	pub fn status_outcome(status: u16, message: &str) -> CallOutcome {
		CallOutcome {
			status,
			result: Err(ForwardError::Http { status, message: message.to_string() }),
		}
	}

	pub fn transport_outcome() -> CallOutcome {
		CallOutcome {
			status: 408,
			result: Err(ForwardError::Transport("connection refused".to_string())),
		}
	}

	pub fn not_found() -> CallOutcome {
		status_outcome(404, "resource not found")
	}

	/// Bech32 address whose decoded bytes end in `last`, so the mock
	/// coordinator assigns it `last % num_shards`.
	pub fn address_ending_in(codec: &AddressCodec, last: u8) -> String {
		let mut bytes = [5u8; PUBKEY_LENGTH];
		bytes[PUBKEY_LENGTH - 1] = last;
		codec.encode(&bytes).unwrap()
	}
}
