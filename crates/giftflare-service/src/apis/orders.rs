//! Error mapping for the order endpoints.
//!
//! Translates coordinator errors into the HTTP error vocabulary:
//! validation failures are 422, missing orders 404, illegal transitions
//! and lost races 409, courier unavailability 503 with a retry hint, and
//! store failures an opaque 500.

use giftflare_core::{BookingError, LifecycleError};
use giftflare_types::ApiError;

/// Suggested client wait before re-attempting a failed booking.
const BOOKING_RETRY_AFTER_SECONDS: u64 = 60;

/// Maps a lifecycle error onto the API error vocabulary.
pub fn api_error_from_lifecycle(e: LifecycleError) -> ApiError {
	match e {
		LifecycleError::Validation(message) => ApiError::UnprocessableEntity {
			error_type: "VALIDATION_FAILED".to_string(),
			message,
		},
		LifecycleError::NotFound(id) => ApiError::NotFound {
			message: format!("order {} not found", id),
		},
		LifecycleError::IllegalTransition { from, to } => ApiError::Conflict {
			error_type: "ILLEGAL_TRANSITION".to_string(),
			message: format!("cannot move order from {} to {}", from, to),
		},
		LifecycleError::Conflict { current } => ApiError::Conflict {
			error_type: "CONCURRENT_UPDATE".to_string(),
			message: format!("order changed concurrently; it is now {}", current),
		},
		LifecycleError::Storage(message) => {
			// Backend details stay in the logs, not in responses
			tracing::error!(error = %message, "Store failure");
			ApiError::InternalServerError {
				message: "storage failure".to_string(),
			}
		}
	}
}

/// Maps a booking error onto the API error vocabulary.
pub fn api_error_from_booking(e: BookingError) -> ApiError {
	match e {
		BookingError::Lifecycle(e) => api_error_from_lifecycle(e),
		BookingError::Courier(e) => ApiError::ServiceUnavailable {
			error_type: "BOOKING_FAILED".to_string(),
			message: e.to_string(),
			retry_after: Some(BOOKING_RETRY_AFTER_SECONDS),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use giftflare_courier::CourierError;
	use giftflare_types::OrderStatus;

	#[test]
	fn lifecycle_errors_map_to_expected_statuses() {
		let cases = [
			(
				api_error_from_lifecycle(LifecycleError::Validation("empty cart".into())),
				422,
			),
			(
				api_error_from_lifecycle(LifecycleError::NotFound("o1".into())),
				404,
			),
			(
				api_error_from_lifecycle(LifecycleError::IllegalTransition {
					from: OrderStatus::Pending,
					to: OrderStatus::Shipped,
				}),
				409,
			),
			(
				api_error_from_lifecycle(LifecycleError::Conflict {
					current: OrderStatus::Cancelled,
				}),
				409,
			),
			(
				api_error_from_lifecycle(LifecycleError::Storage("disk full".into())),
				500,
			),
		];

		for (error, expected) in cases {
			assert_eq!(error.status_code(), expected);
		}
	}

	#[test]
	fn booking_failure_maps_to_service_unavailable_with_retry() {
		let error = api_error_from_booking(BookingError::Courier(CourierError::Timeout));
		assert_eq!(error.status_code(), 503);
		assert_eq!(
			error.to_error_response().retry_after,
			Some(BOOKING_RETRY_AFTER_SECONDS)
		);
	}

	#[test]
	fn booking_lifecycle_errors_keep_their_status() {
		let error = api_error_from_booking(BookingError::Lifecycle(
			LifecycleError::IllegalTransition {
				from: OrderStatus::Shipped,
				to: OrderStatus::Shipped,
			},
		));
		assert_eq!(error.status_code(), 409);
	}
}
