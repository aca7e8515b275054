//! API types for the Giftflare coordinator HTTP API.
//!
//! This module defines the request and error types for the HTTP surface
//! over the five coordinator operations. Successful responses serialize
//! the `Order` aggregate directly.

use crate::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for POST /api/orders/{id}/transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
	/// Target status for the order.
	pub status: OrderStatus,
	/// Required when the target status is shipped.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tracking_number: Option<String>,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// Additional error context.
	pub details: Option<serde_json::Value>,
	/// Suggested retry delay in seconds.
	#[serde(rename = "retryAfter")]
	pub retry_after: Option<u64>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed request (400).
	BadRequest { error_type: String, message: String },
	/// Input rejected by business validation (422).
	UnprocessableEntity { error_type: String, message: String },
	/// Referenced order does not exist (404).
	NotFound { message: String },
	/// Illegal transition or concurrent-update race (409).
	Conflict { error_type: String, message: String },
	/// Downstream collaborator unavailable, e.g. courier booking (503).
	ServiceUnavailable {
		error_type: String,
		message: String,
		retry_after: Option<u64>,
	},
	/// Internal server error (500).
	InternalServerError { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::ServiceUnavailable { .. } => 503,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type, message, ..
			}
			| ApiError::UnprocessableEntity {
				error_type, message, ..
			}
			| ApiError::Conflict {
				error_type, message, ..
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
			ApiError::NotFound { message } => ErrorResponse {
				error: "ORDER_NOT_FOUND".to_string(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
			ApiError::ServiceUnavailable {
				error_type,
				message,
				retry_after,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: *retry_after,
			},
			ApiError::InternalServerError { message } => ErrorResponse {
				error: "INTERNAL_ERROR".to_string(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			}
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
