//! API error type with envelope-shaped responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use proxy_core::ProcessError;
use proxy_types::ReturnCode;
use thiserror::Error;

use crate::shared::respond;

/// Structured API error with the HTTP status it maps to.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The request itself is invalid (400).
	#[error("{0}")]
	BadRequest(String),
	/// The requested entity does not exist (404).
	#[error("{0}")]
	NotFound(String),
	/// An observer answered with a fatal status, surfaced verbatim.
	#[error("{message}")]
	Upstream { status: u16, message: String },
	/// The proxy or its backends failed (500).
	#[error("{0}")]
	Internal(String),
}

impl From<crate::params::ParamError> for ApiError {
	fn from(err: crate::params::ParamError) -> Self {
		ApiError::BadRequest(err.to_string())
	}
}

impl From<ProcessError> for ApiError {
	fn from(err: ProcessError) -> Self {
		match err {
			ProcessError::InvalidTxFields { .. }
			| ProcessError::InvalidSenderAddress
			| ProcessError::Address(_) => ApiError::BadRequest(err.to_string()),
			ProcessError::TransactionNotFound => ApiError::NotFound(err.to_string()),
			ProcessError::Observer { status, message } => {
				if status == 0 {
					ApiError::Internal(message)
				} else {
					ApiError::Upstream { status, message }
				}
			},
			_ => ApiError::Internal(err.to_string()),
		}
	}
}

impl ApiError {
	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::Upstream { status, .. } => {
				StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			},
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn return_code(&self) -> ReturnCode {
		if self.status_code().is_client_error() && self.status_code() != StatusCode::NOT_FOUND {
			ReturnCode::RequestError
		} else {
			ReturnCode::InternalError
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		respond(
			self.status_code(),
			serde_json::Value::Null,
			self.to_string(),
			self.return_code(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_process_error_mapping() {
		let err = ApiError::from(ProcessError::InvalidSenderAddress);
		assert!(matches!(err, ApiError::BadRequest(_)));
		assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(err.return_code(), ReturnCode::RequestError);

		let err = ApiError::from(ProcessError::TransactionNotFound);
		assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(err.return_code(), ReturnCode::InternalError);

		let err = ApiError::from(ProcessError::SendingRequest);
		assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_upstream_status_is_preserved() {
		let err = ApiError::from(ProcessError::Observer {
			status: 418,
			message: "teapot".to_string(),
		});
		assert_eq!(err.status_code().as_u16(), 418);

		// a transport failure with no reply maps to an internal error
		let err = ApiError::from(ProcessError::Observer {
			status: 0,
			message: "no route".to_string(),
		});
		assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
