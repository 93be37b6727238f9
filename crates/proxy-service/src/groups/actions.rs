//! Handlers of the `/actions` route group.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use proxy_types::ReturnCode;
use serde_json::json;

use crate::server::AppState;
use crate::shared::{ok, respond};

/// Registers the operator action routes.
pub fn routes() -> Router<AppState> {
	Router::new().route("/reload-observers", post(reload_observers))
}

async fn reload_observers(State(state): State<AppState>) -> Response {
	let result = state.facade.reload_observers();
	if result.ok {
		ok(json!({"description": result.description}))
	} else {
		respond(
			StatusCode::INTERNAL_SERVER_ERROR,
			serde_json::Value::Null,
			result.error,
			ReturnCode::InternalError,
		)
	}
}
