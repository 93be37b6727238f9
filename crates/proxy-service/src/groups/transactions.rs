//! Handlers of the `/transaction` route group.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use proxy_core::transaction::UNKNOWN_STATUS;
use proxy_core::ProcessError;
use proxy_types::{ReturnCode, Transaction};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::params::{self, QueryMap};
use crate::server::AppState;
use crate::shared::{ok, passthrough, respond};

/// Registers the transaction routes.
pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/send", post(send_transaction))
		.route("/send-multiple", post(send_multiple_transactions))
		.route("/send-user-funds", post(send_user_funds))
		.route("/cost", post(transaction_cost))
		.route("/simulate", post(simulate_transaction))
		.route("/pool", get(transactions_pool))
		.route("/pool/shard/:shard", get(transactions_pool_for_shard))
		.route("/pool/sender/:sender", get(transactions_pool_for_sender))
		.route("/last-nonce/:sender", get(last_pool_nonce_for_sender))
		.route("/nonce-gaps/:sender", get(pool_nonce_gaps_for_sender))
		.route("/:hash", get(get_transaction))
		.route("/:hash/status", get(get_transaction_status))
}

fn decode_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
	serde_json::from_value(body)
		.map_err(|e| ApiError::BadRequest(format!("validation error: {}", e)))
}

async fn send_transaction(
	State(state): State<AppState>,
	Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
	let tx: Transaction = decode_body(body)?;
	let tx_hash = state.facade.transactions.send_transaction(&tx).await?;
	Ok(ok(json!({"txHash": tx_hash})))
}

async fn send_multiple_transactions(
	State(state): State<AppState>,
	Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
	let txs: Vec<Transaction> = decode_body(body)?;
	let result = state.facade.transactions.send_multiple_transactions(&txs).await?;
	Ok(ok(json!({"numOfSentTxs": result.num_of_txs, "txsHashes": result.txs_hashes})))
}

/// Body of a faucet request.
#[derive(Debug, Deserialize)]
struct FundsRequest {
	receiver: String,
	#[serde(default)]
	value: Option<String>,
}

async fn send_user_funds(
	State(state): State<AppState>,
	Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
	let request: FundsRequest = decode_body(body)?;
	state.facade.send_user_funds(&request.receiver, request.value).await?;
	Ok(ok(json!({"message": "ok"})))
}

async fn transaction_cost(
	State(state): State<AppState>,
	Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
	let tx: Transaction = decode_body(body)?;
	let cost = state.facade.transactions.transaction_cost(&tx).await?;
	Ok(ok(json!({"txCost": cost})))
}

async fn simulate_transaction(
	State(state): State<AppState>,
	Query(query): Query<QueryMap>,
	Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
	let options = params::parse_transaction_simulation_options(&query)?;
	let tx: Transaction = decode_body(body)?;
	let reply = state.facade.transactions.simulate_transaction(&tx, &options).await?;
	Ok(passthrough(reply))
}

async fn get_transaction(
	State(state): State<AppState>,
	Path(hash): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_transaction_query_options(&query)?;
	let sender = params::parse_string_param(&query, "sender");

	let transaction = if sender.is_empty() {
		state.facade.transactions.get_transaction(&hash, &options).await?
	} else {
		state
			.facade
			.transactions
			.get_transaction_by_hash_and_sender(&hash, &sender, &options)
			.await?
	};

	Ok(ok(json!({"transaction": transaction})))
}

async fn get_transaction_status(
	State(state): State<AppState>,
	Path(hash): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let sender = params::parse_string_param(&query, "sender");

	match state.facade.transactions.get_transaction_status(&hash, &sender).await {
		Ok(status) => Ok(ok(json!({"status": status}))),
		// no observer knows the hash: report the sentinel status with 404
		Err(ProcessError::TransactionNotFound) => Ok(respond(
			StatusCode::NOT_FOUND,
			json!({"status": UNKNOWN_STATUS}),
			ProcessError::TransactionNotFound.to_string(),
			ReturnCode::InternalError,
		)),
		Err(e) => Err(e.into()),
	}
}

async fn transactions_pool(
	State(state): State<AppState>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_transactions_pool_options(&query)?;

	// a shard-scoped request consults only that shard's observers
	let pool = if options.shard_id.is_empty() {
		state.facade.transactions.transactions_pool(&options.fields).await?
	} else {
		let shard: u32 = options
			.shard_id
			.parse()
			.map_err(|_| ApiError::BadRequest("cannot parse shard id".to_string()))?;
		state
			.facade
			.transactions
			.transactions_pool_for_shard(shard, &options.fields)
			.await?
	};

	Ok(ok(json!({"txPool": pool})))
}

async fn transactions_pool_for_shard(
	State(state): State<AppState>,
	Path(shard): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let shard: u32 = shard
		.parse()
		.map_err(|_| ApiError::BadRequest("cannot parse shard id".to_string()))?;
	let options = params::parse_transactions_pool_options(&query)?;
	let pool = state
		.facade
		.transactions
		.transactions_pool_for_shard(shard, &options.fields)
		.await?;
	Ok(ok(json!({"txPool": pool})))
}

async fn transactions_pool_for_sender(
	State(state): State<AppState>,
	Path(sender): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_transactions_pool_options(&query)?;
	let pool = state
		.facade
		.transactions
		.transactions_pool_for_sender(&sender, &options.fields)
		.await?;
	Ok(ok(json!({"txPool": pool})))
}

async fn last_pool_nonce_for_sender(
	State(state): State<AppState>,
	Path(sender): Path<String>,
) -> Result<Response, ApiError> {
	let nonce = state.facade.transactions.last_pool_nonce_for_sender(&sender).await?;
	Ok(ok(json!({"nonce": nonce})))
}

async fn pool_nonce_gaps_for_sender(
	State(state): State<AppState>,
	Path(sender): Path<String>,
) -> Result<Response, ApiError> {
	let gaps = state.facade.transactions.pool_nonce_gaps_for_sender(&sender).await?;
	Ok(ok(json!({"nonceGaps": gaps})))
}
