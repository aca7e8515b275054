//! Simulated courier implementation.
//!
//! Waits a configurable latency and then returns a generated tracking
//! identifier. This stands in for the storefront's instant-delivery
//! partner during development; a real integration replaces it behind the
//! same interface without touching the transition engine.

use crate::{CourierError, CourierInterface};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Field, FieldType, Order, Schema, ValidationError};
use std::time::Duration;
use uuid::Uuid;

/// Courier that always books successfully after a simulated delay.
pub struct SimulatedCourier {
	latency: Duration,
	tracking_prefix: String,
}

impl SimulatedCourier {
	pub fn new(latency: Duration, tracking_prefix: String) -> Self {
		Self {
			latency,
			tracking_prefix,
		}
	}
}

#[async_trait]
impl CourierInterface for SimulatedCourier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(SimulatedCourierSchema)
	}

	async fn book(&self, order: &Order) -> Result<String, CourierError> {
		tracing::info!(
			order_id = %giftflare_types::truncate_id(&order.id),
			delivery_type = %order.delivery_type,
			"Booking simulated courier"
		);
		tokio::time::sleep(self.latency).await;

		let suffix: String = Uuid::new_v4().simple().to_string()[..10].to_uppercase();
		Ok(format!("{}{}", self.tracking_prefix, suffix))
	}
}

/// Configuration schema for SimulatedCourier.
pub struct SimulatedCourierSchema;

impl ConfigSchema for SimulatedCourierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new(
					"latency_ms",
					FieldType::Integer {
						min: Some(0),
						max: Some(60_000),
					},
				),
				Field::new("tracking_prefix", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

/// Registry for the simulated courier implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "simulated";
	type Factory = crate::CourierFactory;

	fn factory() -> Self::Factory {
		create_courier
	}
}

impl crate::CourierProviderRegistry for Registry {}

/// Factory function to create a simulated courier from configuration.
///
/// Configuration parameters:
/// - `latency_ms`: simulated booking latency (default: 250)
/// - `tracking_prefix`: prefix for generated tracking ids (default: "GF")
pub fn create_courier(config: &toml::Value) -> Result<Box<dyn CourierInterface>, CourierError> {
	let latency_ms = config
		.get("latency_ms")
		.and_then(|v| v.as_integer())
		.unwrap_or(250) as u64;

	let tracking_prefix = config
		.get("tracking_prefix")
		.and_then(|v| v.as_str())
		.unwrap_or("GF")
		.to_string();

	Ok(Box::new(SimulatedCourier::new(
		Duration::from_millis(latency_ms),
		tracking_prefix,
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use giftflare_types::{Address, DeliveryType, GiftOptions, LineItem, OrderStatus};

	fn sample_order() -> Order {
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
			delivery_type: DeliveryType::Instant,
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
	async fn test_generates_prefixed_tracking_ids() {
		let config: toml::Value =
			toml::from_str("latency_ms = 0\ntracking_prefix = \"DZ\"").unwrap();
		let courier = create_courier(&config).unwrap();

		let first = courier.book(&sample_order()).await.unwrap();
		let second = courier.book(&sample_order()).await.unwrap();

		assert!(first.starts_with("DZ"));
		assert_eq!(first.len(), 12);
		assert_ne!(first, second);
	}
}
