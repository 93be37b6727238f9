//! HTTP forwarder for the shard-proxy gateway.
//!
//! The forwarder issues GET and POST calls to observer nodes and reduces
//! every reply to a three-way outcome: success, skip-and-try-the-next
//! observer, or fatal. `404 Not Found` and `408 Request Timeout` are the
//! skip signals; timeouts and refused connections synthesize a 408 so a
//! down observer does not abort a traversal; every other non-2xx reply is
//! fatal and surfaced to the caller verbatim.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Errors a single observer call can produce.
#[derive(Debug, Clone, Error)]
pub enum ForwardError {
	/// The request never produced an HTTP reply.
	#[error("request to observer failed: {0}")]
	Transport(String),
	/// The observer answered with a non-2xx status.
	#[error("{message}")]
	Http { status: u16, message: String },
	/// The observer answered 2xx but the body is not the expected JSON.
	#[error("cannot decode observer response: {0}")]
	Decode(String),
}

/// Result of one observer call: the HTTP status (0 when no reply was
/// received, 408 synthesized for timeouts and refused connections) plus
/// the decoded body or the error.
#[derive(Debug, Clone)]
pub struct CallOutcome {
	pub status: u16,
	pub result: Result<serde_json::Value, ForwardError>,
}

impl CallOutcome {
	/// True when the observer answered 200 with a decodable body.
	pub fn is_success(&self) -> bool {
		self.status == 200 && self.result.is_ok()
	}

	/// True when the traversal should move on to the next observer.
	pub fn should_skip(&self) -> bool {
		matches!(self.status, 404 | 408)
	}

	/// True when the request never reached an answering observer.
	pub fn is_transport_error(&self) -> bool {
		matches!(self.result, Err(ForwardError::Transport(_)))
	}

	/// The error message to surface, empty on success.
	pub fn error_message(&self) -> String {
		match &self.result {
			Ok(_) => String::new(),
			Err(e) => e.to_string(),
		}
	}
}

/// Issues HTTP calls to observers.
///
/// The trait is the seam the processors are tested through: scripted
/// implementations stand in for the network.
#[async_trait]
pub trait Forwarder: Send + Sync {
	/// Issues a GET and decodes the JSON reply.
	async fn call_get(&self, url: &str) -> CallOutcome;

	/// Issues a POST with a JSON body and decodes the JSON reply.
	async fn call_post(&self, url: &str, body: &serde_json::Value) -> CallOutcome;
}

/// `reqwest`-backed forwarder with a per-call timeout.
pub struct HttpForwarder {
	client: reqwest::Client,
}

impl HttpForwarder {
	/// Creates a forwarder applying the given timeout to every call.
	pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ForwardError::Transport(e.to_string()))?;
		Ok(Self { client })
	}

	fn transport_outcome(err: reqwest::Error) -> CallOutcome {
		// a down or unresponsive observer must not abort the traversal
		let status = if err.is_timeout() || err.is_connect() { 408 } else { 0 };
		trace!(status, error = %err, "observer call failed in transport");
		CallOutcome {
			status,
			result: Err(ForwardError::Transport(err.to_string())),
		}
	}

	async fn read_response(response: reqwest::Response) -> CallOutcome {
		let status = response.status().as_u16();
		let bytes = match response.bytes().await {
			Ok(bytes) => bytes,
			Err(e) => return Self::transport_outcome(e),
		};

		if (200..300).contains(&status) {
			let result = serde_json::from_slice(&bytes)
				.map_err(|e| ForwardError::Decode(e.to_string()));
			return CallOutcome { status, result };
		}

		// surface the observer's own error field when it sent one
		let message = serde_json::from_slice::<serde_json::Value>(&bytes)
			.ok()
			.and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
			.filter(|m| !m.is_empty())
			.unwrap_or_else(|| format!("observer answered with status {}", status));

		CallOutcome {
			status,
			result: Err(ForwardError::Http { status, message }),
		}
	}
}

#[async_trait]
impl Forwarder for HttpForwarder {
	async fn call_get(&self, url: &str) -> CallOutcome {
		match self.client.get(url).send().await {
			Ok(response) => Self::read_response(response).await,
			Err(e) => Self::transport_outcome(e),
		}
	}

	async fn call_post(&self, url: &str, body: &serde_json::Value) -> CallOutcome {
		match self.client.post(url).json(body).send().await {
			Ok(response) => Self::read_response(response).await,
			Err(e) => Self::transport_outcome(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::StatusCode;
	use axum::routing::get;
	use axum::{Json, Router};
	use serde_json::json;

	async fn spawn_server() -> String {
		let app = Router::new()
			.route("/ok", get(|| async { Json(json!({"data": {"value": 7}})) }))
			.route("/missing", get(|| async { StatusCode::NOT_FOUND }))
			.route(
				"/boom",
				get(|| async {
					(
						StatusCode::INTERNAL_SERVER_ERROR,
						Json(json!({"data": null, "error": "boom", "code": "internal_issue"})),
					)
				}),
			)
			.route("/garbage", get(|| async { "not json" }));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		format!("http://{}", addr)
	}

	#[tokio::test]
	async fn test_success_decodes_body() {
		let base = spawn_server().await;
		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();

		let outcome = forwarder.call_get(&format!("{}/ok", base)).await;
		assert!(outcome.is_success());
		assert_eq!(outcome.status, 200);
		assert_eq!(outcome.result.unwrap()["data"]["value"], 7);
	}

	#[tokio::test]
	async fn test_not_found_is_skip() {
		let base = spawn_server().await;
		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();

		let outcome = forwarder.call_get(&format!("{}/missing", base)).await;
		assert_eq!(outcome.status, 404);
		assert!(outcome.should_skip());
		assert!(!outcome.is_success());
	}

	#[tokio::test]
	async fn test_server_error_is_fatal_with_upstream_message() {
		let base = spawn_server().await;
		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();

		let outcome = forwarder.call_get(&format!("{}/boom", base)).await;
		assert_eq!(outcome.status, 500);
		assert!(!outcome.should_skip());
		assert_eq!(outcome.error_message(), "boom");
	}

	#[tokio::test]
	async fn test_garbage_body_is_decode_error() {
		let base = spawn_server().await;
		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();

		let outcome = forwarder.call_get(&format!("{}/garbage", base)).await;
		assert_eq!(outcome.status, 200);
		assert!(!outcome.is_success());
		assert!(matches!(outcome.result, Err(ForwardError::Decode(_))));
	}

	#[tokio::test]
	async fn test_refused_connection_synthesizes_skip() {
		// bind and drop a listener so the port is closed
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();
		let outcome = forwarder.call_get(&format!("http://{}/ok", addr)).await;
		assert_eq!(outcome.status, 408);
		assert!(outcome.should_skip());
		assert!(outcome.is_transport_error());
	}

	#[tokio::test]
	async fn test_post_sends_json_body() {
		let app = Router::new().route(
			"/echo",
			axum::routing::post(|Json(body): Json<serde_json::Value>| async move {
				Json(json!({"data": body}))
			}),
		);
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		let forwarder = HttpForwarder::new(Duration::from_secs(2)).unwrap();
		let outcome = forwarder
			.call_post(&format!("http://{}/echo", addr), &json!({"nonce": 4}))
			.await;
		assert!(outcome.is_success());
		assert_eq!(outcome.result.unwrap()["data"]["nonce"], 4);
	}
}
