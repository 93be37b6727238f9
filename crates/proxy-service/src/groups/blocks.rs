//! Handlers of the `/block`, `/blocks` and `/hyperblock` route groups.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::error::ApiError;
use crate::params::{self, QueryMap};
use crate::server::AppState;
use crate::shared::{ok, passthrough};

/// Registers the single-block routes.
pub fn block_routes() -> Router<AppState> {
	Router::new()
		.route("/:shard/by-nonce/:nonce", get(block_by_nonce))
		.route("/:shard/by-hash/:hash", get(block_by_hash))
}

/// Registers the blocks-by-round routes.
pub fn blocks_routes() -> Router<AppState> {
	Router::new().route("/by-round/:round", get(blocks_by_round))
}

/// Registers the hyperblock routes.
pub fn hyperblock_routes() -> Router<AppState> {
	Router::new()
		.route("/by-nonce/:nonce", get(hyperblock_by_nonce))
		.route("/by-hash/:hash", get(hyperblock_by_hash))
}

fn parse_shard(raw: &str) -> Result<u32, ApiError> {
	raw.parse().map_err(|_| ApiError::BadRequest("cannot parse shard id".to_string()))
}

fn parse_nonce(raw: &str) -> Result<u64, ApiError> {
	raw.parse().map_err(|_| ApiError::BadRequest("cannot parse nonce".to_string()))
}

async fn block_by_nonce(
	State(state): State<AppState>,
	Path((shard, nonce)): Path<(String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let shard = parse_shard(&shard)?;
	let nonce = parse_nonce(&nonce)?;
	let options = params::parse_block_query_options(&query)?;

	let reply = state.facade.block.get_block_by_nonce(shard, nonce, &options).await?;
	Ok(passthrough(reply))
}

async fn block_by_hash(
	State(state): State<AppState>,
	Path((shard, hash)): Path<(String, String)>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let shard = parse_shard(&shard)?;
	let options = params::parse_block_query_options(&query)?;

	let reply = state.facade.block.get_block_by_hash(shard, &hash, &options).await?;
	Ok(passthrough(reply))
}

async fn blocks_by_round(
	State(state): State<AppState>,
	Path(round): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let round = round
		.parse::<u64>()
		.map_err(|_| ApiError::BadRequest("cannot parse round".to_string()))?;
	let options = params::parse_block_query_options(&query)?;

	let blocks = state.facade.blocks.get_blocks_by_round(round, &options).await?;
	Ok(ok(json!({"blocks": blocks})))
}

async fn hyperblock_by_nonce(
	State(state): State<AppState>,
	Path(nonce): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let nonce = parse_nonce(&nonce)?;
	let options = params::parse_hyperblock_query_options(&query)?;

	let reply = state.facade.hyperblocks.get_hyperblock_by_nonce(nonce, &options).await?;
	Ok(passthrough(reply))
}

async fn hyperblock_by_hash(
	State(state): State<AppState>,
	Path(hash): Path<String>,
	Query(query): Query<QueryMap>,
) -> Result<Response, ApiError> {
	let options = params::parse_hyperblock_query_options(&query)?;

	let reply = state.facade.hyperblocks.get_hyperblock_by_hash(&hash, &options).await?;
	Ok(passthrough(reply))
}
