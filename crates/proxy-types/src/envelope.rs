//! The uniform response envelope.
//!
//! Every client-facing reply is `{ data, error, code }`. Observers answer
//! with the same shape, so the envelope types double as decode targets for
//! upstream replies.

use serde::{Deserialize, Serialize};

/// Outcome class of a client-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnCode {
	/// The request was resolved.
	#[serde(rename = "successful")]
	Success,
	/// The proxy or its observers failed while resolving the request.
	#[serde(rename = "internal_issue")]
	InternalError,
	/// The request itself was invalid.
	#[serde(rename = "request_error")]
	RequestError,
}

/// Typed envelope for decoding an observer reply whose `data` shape is known.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
	pub data: Option<T>,
	#[serde(default)]
	pub error: String,
	#[serde(default)]
	pub code: String,
}

impl<T> Envelope<T> {
	/// Extracts the payload, surfacing the upstream error message when the
	/// reply carried no data.
	pub fn into_data(self) -> Result<T, String> {
		match self.data {
			Some(data) => Ok(data),
			None if !self.error.is_empty() => Err(self.error),
			None => Err("empty response data".to_string()),
		}
	}
}
