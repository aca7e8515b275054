//! Courier booking module for the Giftflare coordinator.
//!
//! This module obtains tracking identifiers from external couriers. It
//! provides abstractions over different courier integrations, routing
//! each booking to the provider configured for the order's delivery
//! type. Booking failures are reported to the caller; the engine never
//! retries them in-process.

use async_trait::async_trait;
use giftflare_types::{ConfigSchema, DeliveryType, ImplementationRegistry, Order};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod simulated;
}

/// Errors that can occur during courier booking operations.
#[derive(Debug, Error)]
pub enum CourierError {
	/// The courier declined the booking.
	#[error("Booking failed: {0}")]
	BookingFailed(String),
	/// The courier did not answer within the booking timeout.
	#[error("Booking timed out")]
	Timeout,
	/// Error during network communication with the courier.
	#[error("Network error: {0}")]
	Network(String),
	/// No provider is configured for the order's delivery type.
	#[error("No courier available for delivery type")]
	NoProviderAvailable,
	/// Error in the implementation's configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for courier providers.
#[async_trait]
pub trait CourierInterface: Send + Sync {
	/// Returns the configuration schema for this courier implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Books a pickup for the order and returns the tracking identifier.
	async fn book(&self, order: &Order) -> Result<String, CourierError>;
}

/// Type alias for courier factory functions.
pub type CourierFactory = fn(&toml::Value) -> Result<Box<dyn CourierInterface>, CourierError>;

/// Registry trait for courier implementations.
pub trait CourierProviderRegistry: ImplementationRegistry<Factory = CourierFactory> {}

/// Get all registered courier implementations.
pub fn get_all_implementations() -> Vec<(&'static str, CourierFactory)> {
	use implementations::{http, simulated};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(simulated::Registry::NAME, simulated::Registry::factory()),
	]
}

/// Service that routes bookings to the provider for each delivery type.
///
/// Configuration guarantees at most one provider per delivery type, so
/// routing is unambiguous. Every booking call carries the configured
/// timeout; a timed-out booking is a failure for that attempt, not a
/// system fault.
pub struct CourierService {
	providers: HashMap<DeliveryType, Box<dyn CourierInterface>>,
	booking_timeout: Duration,
}

impl CourierService {
	/// Creates a new CourierService with the given providers.
	pub fn new(
		providers: HashMap<DeliveryType, Box<dyn CourierInterface>>,
		booking_timeout: Duration,
	) -> Self {
		Self {
			providers,
			booking_timeout,
		}
	}

	/// Books a courier for the order, returning the tracking identifier.
	pub async fn book(&self, order: &Order) -> Result<String, CourierError> {
		let provider = self
			.providers
			.get(&order.delivery_type)
			.ok_or(CourierError::NoProviderAvailable)?;

		tokio::time::timeout(self.booking_timeout, provider.book(order))
			.await
			.unwrap_or(Err(CourierError::Timeout))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use giftflare_types::{Address, GiftOptions, LineItem, OrderStatus, Schema, ValidationError};

	struct StubCourier {
		delay: Duration,
		tracking: String,
	}

	#[async_trait]
	impl CourierInterface for StubCourier {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			struct Empty;
			impl ConfigSchema for Empty {
				fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
					Schema::new(vec![], vec![]).validate(config)
				}
			}
			Box::new(Empty)
		}

		async fn book(&self, _order: &Order) -> Result<String, CourierError> {
			tokio::time::sleep(self.delay).await;
			Ok(self.tracking.clone())
		}
	}

	fn sample_order(delivery_type: DeliveryType) -> Order {
		Order {
			id: "order-1".into(),
			buyer_id: "buyer-1".into(),
			items: vec![LineItem {
				product_id: "p1".into(),
				seller_id: "s1".into(),
				name: "Gift hamper".into(),
				quantity: 1,
				unit_price: 150_000,
				gift: GiftOptions::default(),
			}],
			total_amount: 150_000,
			delivery_type,
			delivery_address: Address {
				name: "Asha".into(),
				line1: "12 MG Road".into(),
				line2: None,
				city: "Bengaluru".into(),
				pincode: "560001".into(),
				country: "IN".into(),
				phone: None,
			},
			friend_delivery: None,
			status: OrderStatus::Confirmed,
			tracking_number: None,
			payment_reference: None,
			created_at: 100,
			updated_at: 100,
		}
	}

	#[tokio::test]
	async fn test_routes_by_delivery_type() {
		let mut providers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		providers.insert(
			DeliveryType::Instant,
			Box::new(StubCourier {
				delay: Duration::ZERO,
				tracking: "FAST-1".into(),
			}),
		);
		providers.insert(
			DeliveryType::Standard,
			Box::new(StubCourier {
				delay: Duration::ZERO,
				tracking: "SLOW-1".into(),
			}),
		);
		let service = CourierService::new(providers, Duration::from_secs(1));

		let tracking = service.book(&sample_order(DeliveryType::Instant)).await.unwrap();
		assert_eq!(tracking, "FAST-1");
		let tracking = service.book(&sample_order(DeliveryType::Standard)).await.unwrap();
		assert_eq!(tracking, "SLOW-1");
	}

	#[tokio::test]
	async fn test_missing_provider_reported() {
		let service = CourierService::new(HashMap::new(), Duration::from_secs(1));
		let result = service.book(&sample_order(DeliveryType::Instant)).await;
		assert!(matches!(result, Err(CourierError::NoProviderAvailable)));
	}

	#[tokio::test]
	async fn test_slow_booking_times_out() {
		let mut providers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		providers.insert(
			DeliveryType::Instant,
			Box::new(StubCourier {
				delay: Duration::from_millis(50),
				tracking: "LATE-1".into(),
			}),
		);
		let service = CourierService::new(providers, Duration::from_millis(5));

		let result = service.book(&sample_order(DeliveryType::Instant)).await;
		assert!(matches!(result, Err(CourierError::Timeout)));
	}
}
