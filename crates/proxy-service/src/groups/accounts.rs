//! Handlers of the `/address` route group.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::error::ApiError;
use crate::params::{self, QueryMap};
use crate::server::AppState;
use crate::shared::{ok, passthrough};

/// Registers the account routes.
pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/:address", get(get_account))
		.route("/:address/balance", get(get_balance))
		.route("/:address/username", get(get_username))
		.route("/:address/nonce", get(get_nonce))
		.route("/:address/shard", get(get_shard))
		.route("/:address/transactions", get(get_transactions))
		.route("/:address/keys", get(get_key_value_pairs))
		.route("/:address/key/:key", get(get_value_for_key))
		.route("/:address/esdt", get(get_esdt_tokens))
		.route("/:address/esdt/:token", get(get_esdt_token_data))
		.route("/:address/esdts-with-role/:role", get(get_esdts_with_role))
		.route("/:address/esdts/roles", get(get_esdts_roles))
		.route("/:address/registered-nfts", get(get_registered_nfts))
		.route("/:address/nft/:token/nonce/:nonce", get(get_esdt_nft_token_data))
}

async fn get_account(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let model = state.facade.accounts.get_account(&address, &options).await?;
	Ok(ok(json!({"account": model.account, "blockInfo": model.block_info})))
}

async fn get_balance(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let model = state.facade.accounts.get_account(&address, &options).await?;
	Ok(ok(json!({"balance": model.account.balance, "blockInfo": model.block_info})))
}

async fn get_username(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let model = state.facade.accounts.get_account(&address, &options).await?;
	Ok(ok(json!({"username": model.account.username, "blockInfo": model.block_info})))
}

async fn get_nonce(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let model = state.facade.accounts.get_account(&address, &options).await?;
	Ok(ok(json!({"nonce": model.account.nonce, "blockInfo": model.block_info})))
}

/// Answers locally from the proxy's own shard configuration.
async fn get_shard(
	State(state): State<AppState>,
	Path(address): Path<String>,
) -> Result<Response, ApiError> {
	let shard = state.facade.accounts.get_shard_id_for_address(&address)?;
	Ok(ok(json!({"shardID": shard})))
}

async fn get_transactions(
	State(state): State<AppState>,
	Path(address): Path<String>,
) -> Result<Response, ApiError> {
	let transactions = state.facade.accounts.get_transactions(&address).await?;
	Ok(ok(json!({"transactions": transactions})))
}

async fn get_value_for_key(
	State(state): State<AppState>,
	Path((address, key)): Path<(String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let value = state.facade.accounts.get_value_for_key(&address, &key, &options).await?;
	Ok(ok(json!({"value": value})))
}

async fn get_key_value_pairs(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state.facade.accounts.get_key_value_pairs(&address, &options).await?;
	Ok(passthrough(reply))
}

async fn get_esdt_tokens(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state.facade.accounts.get_all_esdt_tokens(&address, &options).await?;
	Ok(passthrough(reply))
}

async fn get_esdt_token_data(
	State(state): State<AppState>,
	Path((address, token)): Path<(String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state.facade.accounts.get_esdt_token_data(&address, &token, &options).await?;
	Ok(passthrough(reply))
}

async fn get_esdts_with_role(
	State(state): State<AppState>,
	Path((address, role)): Path<(String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state.facade.accounts.get_esdts_with_role(&address, &role, &options).await?;
	Ok(passthrough(reply))
}

async fn get_esdts_roles(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state.facade.accounts.get_esdts_roles(&address, &options).await?;
	Ok(passthrough(reply))
}

async fn get_registered_nfts(
	State(state): State<AppState>,
	Path(address): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let reply = state
		.facade
		.accounts
		.get_nft_token_ids_registered_by_address(&address, &options)
		.await?;
	Ok(passthrough(reply))
}

async fn get_esdt_nft_token_data(
	State(state): State<AppState>,
	Path((address, token, nonce)): Path<(String, String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_account_query_options(&query)?;
	let nonce: u64 = nonce
		.parse()
		.map_err(|_| ApiError::BadRequest("cannot parse nonce".to_string()))?;
	let reply = state
		.facade
		.accounts
		.get_esdt_nft_token_data(&address, &token, nonce, &options)
		.await?;
	Ok(passthrough(reply))
}
