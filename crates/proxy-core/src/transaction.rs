//! Transaction dispatch, retrieval and status resolution.
//!
//! Submission is routed to the sender's shard. Status resolution is the one
//! place where "first answer wins" is not enough: a cross-shard transaction
//! is dispatched by the source shard but executed by the destination shard,
//! so the destination's view is preferred whenever it is reachable.

use crate::base::{decode_envelope, get_first_success, post_first_success, CoreProcessor};
use crate::ProcessError;
use proxy_types::{
	build_url_with_pool_options, build_url_with_simulation_options,
	build_url_with_transaction_query_options, AddressCodec, ApiTransaction,
	MultipleTransactionsData, Observer, PoolForSenderData, PoolNonceData, PoolNonceGapsData,
	ShardId, Transaction, TransactionCostData, TransactionData, TransactionQueryOptions,
	TransactionSimulationOptions, TransactionsPool, TransactionsPoolData,
	TransactionsPoolForSender, TransactionsPoolNonceGaps, TransactionsPoolOptions,
	METACHAIN_SHARD_ID,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// The transaction group path of observers.
pub const TRANSACTION_PATH: &str = "/transaction/";

/// The single transaction send path of observers.
pub const TRANSACTION_SEND_PATH: &str = "/transaction/send";

/// The multiple transactions send path of observers.
pub const MULTIPLE_TRANSACTIONS_PATH: &str = "/transaction/send-multiple";

/// The transaction cost path of observers.
pub const TRANSACTION_COST_PATH: &str = "/transaction/cost";

/// The transaction simulation path of observers.
pub const TRANSACTION_SIMULATE_PATH: &str = "/transaction/simulate";

/// The transactions pool path of observers.
pub const TRANSACTION_POOL_PATH: &str = "/transaction/pool";

/// Status reported when no observer yields an answer.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Resolves transaction requests against the relevant observers.
pub struct TransactionProcessor {
	proc: Arc<dyn CoreProcessor>,
	codec: AddressCodec,
}

impl TransactionProcessor {
	/// Creates a new transaction processor.
	pub fn new(proc: Arc<dyn CoreProcessor>, codec: AddressCodec) -> Self {
		Self { proc, codec }
	}

	/// Relays one transaction to the sender's shard and returns the hash
	/// assigned by the first answering observer.
	pub async fn send_transaction(&self, tx: &Transaction) -> Result<String, ProcessError> {
		self.check_transaction_fields(tx)?;

		let sender_bytes = self.codec.decode(&tx.sender)?;
		let shard = self.proc.compute_shard_id(&sender_bytes)?;
		let observers = self.proc.observers(shard)?;

		let body = to_body(tx)?;
		let reply =
			post_first_success(self.proc.as_ref(), &observers, TRANSACTION_SEND_PATH, &body).await?;
		let data: proxy_types::SendTransactionData = decode_envelope(reply)?;

		info!(shard, tx_hash = %data.tx_hash, "transaction sent");
		Ok(data.tx_hash)
	}

	/// Relays a bulk submission, grouping the valid transactions by sender
	/// shard and sending each group to the first available observer of its
	/// shard.
	///
	/// Inside a group the returned hashes are keyed by the position each
	/// transaction had in the submitted group; they are merged back under
	/// the index the transaction had in the client's array.
	pub async fn send_multiple_transactions(
		&self,
		txs: &[Transaction],
	) -> Result<MultipleTransactionsData, ProcessError> {
		let mut txs_to_send = Vec::new();
		for (index, tx) in txs.iter().enumerate() {
			if let Err(e) = self.check_transaction_fields(tx) {
				warn!(sender = %tx.sender, receiver = %tx.receiver, error = %e,
					"invalid transaction received");
				continue;
			}
			// the index is stamped on a clone, never on the caller's input
			let mut tx = tx.clone();
			tx.index = index;
			txs_to_send.push(tx);
		}
		if txs_to_send.is_empty() {
			return Err(ProcessError::NoValidTransactionToSend);
		}

		let mut total_sent = 0u64;
		let mut txs_hashes = HashMap::new();
		for (shard, group) in self.group_txs_by_shard(txs_to_send) {
			let observers = self.proc.observers(shard)?;
			let body =
				serde_json::to_value(&group).map_err(|e| ProcessError::Decode(e.to_string()))?;

			for observer in &observers {
				let outcome = self
					.proc
					.call_post(&observer.address, MULTIPLE_TRANSACTIONS_PATH, body.clone())
					.await;

				if outcome.is_success() {
					let reply = outcome.result.unwrap_or_default();
					let data: MultipleTransactionsData = decode_envelope(reply)?;
					info!(
						observer = %observer.address,
						shard,
						total_processed = data.num_of_txs,
						"transactions sent"
					);
					total_sent += data.num_of_txs;
					for (position, hash) in data.txs_hashes {
						if let Some(tx) = group.get(position) {
							txs_hashes.insert(tx.index, hash);
						}
					}
					break;
				}

				if outcome.is_transport_error() {
					trace!(observer = %observer.address, "skipping unreachable observer");
					continue;
				}

				// an HTTP-level failure abandons the whole group
				warn!(
					observer = %observer.address,
					shard,
					status = outcome.status,
					error = %outcome.error_message(),
					"shard group abandoned"
				);
				break;
			}
		}

		Ok(MultipleTransactionsData { num_of_txs: total_sent, txs_hashes })
	}

	/// Returns the gas units a transaction would cost.
	///
	/// Metachain observers never execute user transactions and are excluded
	/// from the candidate list.
	pub async fn transaction_cost(&self, tx: &Transaction) -> Result<String, ProcessError> {
		self.check_transaction_fields(tx)?;

		let candidates: Vec<Observer> = self
			.proc
			.all_observers()
			.into_iter()
			.filter(|o| !o.is_metachain())
			.collect();

		let body = to_body(tx)?;
		let reply =
			post_first_success(self.proc.as_ref(), &candidates, TRANSACTION_COST_PATH, &body)
				.await?;
		let data: TransactionCostData = decode_envelope(reply)?;
		Ok(data.tx_cost.to_string())
	}

	/// Simulates a transaction on the sender's shard without executing it.
	pub async fn simulate_transaction(
		&self,
		tx: &Transaction,
		options: &TransactionSimulationOptions,
	) -> Result<serde_json::Value, ProcessError> {
		self.check_transaction_fields(tx)?;

		let sender_bytes = self.codec.decode(&tx.sender)?;
		let shard = self.proc.compute_shard_id(&sender_bytes)?;
		let observers = self.proc.observers(shard)?;

		let path = build_url_with_simulation_options(TRANSACTION_SIMULATE_PATH, options);
		let body = to_body(tx)?;
		post_first_success(self.proc.as_ref(), &observers, &path, &body).await
	}

	/// Returns a transaction by hash, asking every observer in order.
	///
	/// Any failure skips to the next observer; when no observer knows the
	/// hash the result is an explicit not-found.
	pub async fn get_transaction(
		&self,
		tx_hash: &str,
		options: &TransactionQueryOptions,
	) -> Result<ApiTransaction, ProcessError> {
		let path = build_url_with_transaction_query_options(
			&format!("{}{}", TRANSACTION_PATH, tx_hash),
			options,
		);

		for observer in self.proc.all_observers() {
			if let Some(tx) = self.tx_from_observer(&observer, &path).await {
				return Ok(tx);
			}
		}

		Err(ProcessError::TransactionNotFound)
	}

	/// Returns a transaction by hash, asking only the sender's shard.
	pub async fn get_transaction_by_hash_and_sender(
		&self,
		tx_hash: &str,
		sender: &str,
		options: &TransactionQueryOptions,
	) -> Result<ApiTransaction, ProcessError> {
		let shard = self
			.shard_by_address(sender)
			.map_err(|_| ProcessError::InvalidSenderAddress)?;
		let observers = self.proc.observers(shard)?;

		let path = build_url_with_transaction_query_options(
			&format!("{}{}", TRANSACTION_PATH, tx_hash),
			options,
		);
		for observer in &observers {
			if let Some(tx) = self.tx_from_observer(observer, &path).await {
				return Ok(tx);
			}
		}

		Err(ProcessError::TransactionNotFound)
	}

	/// Resolves the status of a transaction.
	///
	/// The first observer that knows the hash provides a candidate answer.
	/// For an intra-shard transaction, or when that observer already sits
	/// in the destination shard, the answer is authoritative. Otherwise the
	/// destination shard carries the executed status and is consulted as an
	/// override, falling back to the source-shard answer when unreachable.
	pub async fn get_transaction_status(
		&self,
		tx_hash: &str,
		sender: &str,
	) -> Result<String, ProcessError> {
		if !sender.is_empty() {
			return self.status_with_sender(tx_hash, sender).await;
		}

		let path = format!("{}{}", TRANSACTION_PATH, tx_hash);
		for observer in self.proc.all_observers() {
			let Some(tx) = self.tx_from_observer(&observer, &path).await else {
				continue;
			};

			// a shard that cannot be computed leaves the fetched answer as
			// the best available one
			let (Ok(snd_shard), Ok(rcv_shard)) =
				(self.shard_by_address(&tx.sender), self.shard_by_address(&tx.receiver))
			else {
				return Ok(tx.status);
			};

			let intra_shard = snd_shard == rcv_shard;
			let observer_in_destination = rcv_shard == observer.shard_id;
			if intra_shard || observer_in_destination {
				return Ok(tx.status);
			}

			if let Some(status) = self.status_from_destination_shard(tx_hash, rcv_shard).await {
				return Ok(status);
			}

			return Ok(tx.status);
		}

		Err(ProcessError::TransactionNotFound)
	}

	async fn status_with_sender(
		&self,
		tx_hash: &str,
		sender: &str,
	) -> Result<String, ProcessError> {
		let snd_shard = self
			.shard_by_address(sender)
			.map_err(|_| ProcessError::InvalidSenderAddress)?;
		let observers = self.proc.observers(snd_shard)?;

		let path = format!("{}{}", TRANSACTION_PATH, tx_hash);
		for observer in &observers {
			let Some(tx) = self.tx_from_observer(observer, &path).await else {
				continue;
			};

			let Ok(rcv_shard) = self.shard_by_address(&tx.receiver) else {
				return Ok(tx.status);
			};

			if rcv_shard == snd_shard {
				return Ok(tx.status);
			}

			if let Some(status) = self.status_from_destination_shard(tx_hash, rcv_shard).await {
				return Ok(status);
			}

			return Ok(tx.status);
		}

		Err(ProcessError::TransactionNotFound)
	}

	async fn status_from_destination_shard(
		&self,
		tx_hash: &str,
		shard: ShardId,
	) -> Option<String> {
		let observers = self.proc.observers(shard).ok()?;

		let path = format!("{}{}", TRANSACTION_PATH, tx_hash);
		for observer in &observers {
			if let Some(tx) = self.tx_from_observer(observer, &path).await {
				return Some(tx.status);
			}
		}

		None
	}

	async fn tx_from_observer(&self, observer: &Observer, path: &str) -> Option<ApiTransaction> {
		let outcome = self.proc.call_get(&observer.address, path).await;
		if !outcome.is_success() {
			trace!(
				observer = %observer.address,
				status = outcome.status,
				error = %outcome.error_message(),
				"cannot get transaction"
			);
			return None;
		}

		match decode_envelope::<TransactionData>(outcome.result.ok()?) {
			Ok(data) => Some(data.transaction),
			Err(e) => {
				trace!(observer = %observer.address, error = %e, "cannot get transaction");
				None
			},
		}
	}

	/// Returns the pooled transactions of every shard, merged.
	///
	/// Shards whose observers were all skipped contribute nothing; a fatal
	/// observer reply aborts the request.
	pub async fn transactions_pool(&self, fields: &str) -> Result<TransactionsPool, ProcessError> {
		let mut pool = TransactionsPool::default();
		for shard in self.proc.shard_ids() {
			match self.pool_for_shard(shard, fields).await {
				Ok(shard_pool) => pool.merge(shard_pool),
				Err(ProcessError::SendingRequest) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(pool)
	}

	/// Returns the pooled transactions of one shard.
	pub async fn transactions_pool_for_shard(
		&self,
		shard: ShardId,
		fields: &str,
	) -> Result<TransactionsPool, ProcessError> {
		self.pool_for_shard(shard, fields).await
	}

	async fn pool_for_shard(
		&self,
		shard: ShardId,
		fields: &str,
	) -> Result<TransactionsPool, ProcessError> {
		let observers = self.proc.observers(shard)?;
		let options =
			TransactionsPoolOptions { fields: fields.to_string(), ..Default::default() };
		let path = build_url_with_pool_options(TRANSACTION_POOL_PATH, &options);

		let reply = get_first_success(self.proc.as_ref(), &observers, &path).await?;
		let data: TransactionsPoolData = decode_envelope(reply)?;
		Ok(data.tx_pool)
	}

	/// Returns the pooled transactions of one sender, from its shard.
	pub async fn transactions_pool_for_sender(
		&self,
		sender: &str,
		fields: &str,
	) -> Result<TransactionsPoolForSender, ProcessError> {
		let options = TransactionsPoolOptions {
			sender: sender.to_string(),
			fields: fields.to_string(),
			..Default::default()
		};
		let reply = self.sender_pool_query(sender, &options).await?;
		let data: PoolForSenderData = decode_envelope(reply)?;
		let mut pool = data.tx_pool;
		pool.sender = sender.to_string();
		Ok(pool)
	}

	/// Returns the highest pooled nonce of one sender.
	pub async fn last_pool_nonce_for_sender(&self, sender: &str) -> Result<u64, ProcessError> {
		let options = TransactionsPoolOptions {
			sender: sender.to_string(),
			last_nonce: true,
			..Default::default()
		};
		let reply = self.sender_pool_query(sender, &options).await?;
		let data: PoolNonceData = decode_envelope(reply)?;
		Ok(data.nonce)
	}

	/// Returns the nonce gaps in the pool of one sender.
	pub async fn pool_nonce_gaps_for_sender(
		&self,
		sender: &str,
	) -> Result<TransactionsPoolNonceGaps, ProcessError> {
		let options = TransactionsPoolOptions {
			sender: sender.to_string(),
			nonce_gaps: true,
			..Default::default()
		};
		let reply = self.sender_pool_query(sender, &options).await?;
		let data: PoolNonceGapsData = decode_envelope(reply)?;
		let mut gaps = data.nonce_gaps;
		gaps.sender = sender.to_string();
		Ok(gaps)
	}

	async fn sender_pool_query(
		&self,
		sender: &str,
		options: &TransactionsPoolOptions,
	) -> Result<serde_json::Value, ProcessError> {
		let shard = self
			.shard_by_address(sender)
			.map_err(|_| ProcessError::InvalidSenderAddress)?;
		let observers = self.proc.observers(shard)?;
		let path = build_url_with_pool_options(TRANSACTION_POOL_PATH, options);
		get_first_success(self.proc.as_ref(), &observers, &path).await
	}

	fn group_txs_by_shard(&self, txs: Vec<Transaction>) -> BTreeMap<ShardId, Vec<Transaction>> {
		let mut groups: BTreeMap<ShardId, Vec<Transaction>> = BTreeMap::new();
		for tx in txs {
			let Ok(sender_bytes) = self.codec.decode(&tx.sender) else {
				continue;
			};
			let Ok(shard) = self.proc.compute_shard_id(&sender_bytes) else {
				continue;
			};
			groups.entry(shard).or_default().push(tx);
		}
		groups
	}

	fn shard_by_address(&self, address: &str) -> Result<ShardId, ProcessError> {
		if address == METACHAIN_SHARD_ID.to_string() {
			return Ok(METACHAIN_SHARD_ID);
		}

		let bytes = self.codec.decode(address)?;
		self.proc.compute_shard_id(&bytes)
	}

	/// Validates the decodable fields of a submitted transaction: sender
	/// and receiver addresses plus the hex signature.
	fn check_transaction_fields(&self, tx: &Transaction) -> Result<(), ProcessError> {
		if let Err(e) = self.codec.decode(&tx.sender) {
			return Err(ProcessError::InvalidTxFields {
				message: "invalid sender address".to_string(),
				reason: e.to_string(),
			});
		}

		if let Err(e) = self.codec.decode(&tx.receiver) {
			return Err(ProcessError::InvalidTxFields {
				message: "invalid receiver address".to_string(),
				reason: e.to_string(),
			});
		}

		if let Err(e) = hex::decode(tx.signature.as_deref().unwrap_or_default()) {
			return Err(ProcessError::InvalidTxFields {
				message: "invalid signature hex".to_string(),
				reason: e.to_string(),
			});
		}

		Ok(())
	}
}

fn to_body(tx: &Transaction) -> Result<serde_json::Value, ProcessError> {
	serde_json::to_value(tx).map_err(|e| ProcessError::Decode(e.to_string()))
}
