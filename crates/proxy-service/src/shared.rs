//! Envelope response helpers shared by every route group.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proxy_types::ReturnCode;
use serde_json::json;

/// Builds an envelope-shaped reply `{ data, error, code }`.
pub fn respond(
	status: StatusCode,
	data: serde_json::Value,
	error: impl Into<String>,
	code: ReturnCode,
) -> Response {
	(
		status,
		Json(json!({
			"data": data,
			"error": error.into(),
			"code": code,
		})),
	)
		.into_response()
}

/// Builds a successful envelope reply.
pub fn ok(data: serde_json::Value) -> Response {
	respond(StatusCode::OK, data, "", ReturnCode::Success)
}

/// Returns an upstream envelope verbatim with status 200. Used by the
/// passthrough endpoints, where the observer already produced the final
/// reply shape.
pub fn passthrough(body: serde_json::Value) -> Response {
	(StatusCode::OK, Json(body)).into_response()
}
