//! HTTP server for the proxy API.
//!
//! This module wires the route groups over the facade and runs the axum
//! server.

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::facade::ProxyFacade;
use crate::groups;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the facade resolving every request.
	pub facade: Arc<ProxyFacade>,
}

/// Starts the HTTP server for the proxy API.
pub async fn start_server(
	port: u16,
	facade: Arc<ProxyFacade>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { facade };

	let app = Router::new()
		.nest("/address", groups::accounts::routes())
		.nest("/transaction", groups::transactions::routes())
		.nest("/block", groups::blocks::block_routes())
		.nest("/blocks", groups::blocks::blocks_routes())
		.nest("/hyperblock", groups::blocks::hyperblock_routes())
		.nest("/actions", groups::actions::routes())
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("0.0.0.0:{}", port);
	let listener = TcpListener::bind(&bind_address).await?;

	info!("Proxy API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
