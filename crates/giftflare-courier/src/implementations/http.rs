//! HTTP courier implementation.
//!
//! Posts bookings to a courier partner's REST API and reads the tracking
//! identifier out of the response. Client errors from the partner are
//! reported as booking failures; transport problems as network errors.

use crate::{CourierError, CourierInterface};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Field, FieldType, Order, Schema, ValidationError};

/// Courier speaking a JSON POST booking API.
pub struct HttpCourier {
	client: reqwest::Client,
	endpoint: String,
	api_key: Option<String>,
}

#[async_trait]
impl CourierInterface for HttpCourier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpCourierSchema)
	}

	async fn book(&self, order: &Order) -> Result<String, CourierError> {
		let payload = serde_json::json!({
			"orderId": order.id,
			"deliveryType": order.delivery_type,
			"dropAddress": order.delivery_address,
		});

		let mut request = self.client.post(&self.endpoint).json(&payload);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| CourierError::Network(e.to_string()))?;

		if response.status().is_client_error() {
			return Err(CourierError::BookingFailed(format!(
				"courier returned {}",
				response.status()
			)));
		}
		if !response.status().is_success() {
			return Err(CourierError::Network(format!(
				"courier returned {}",
				response.status()
			)));
		}

		let body: serde_json::Value = response
			.json()
			.await
			.map_err(|e| CourierError::Network(e.to_string()))?;

		body.get("trackingId")
			.and_then(|v| v.as_str())
			.map(str::to_string)
			.ok_or_else(|| {
				CourierError::BookingFailed("courier response missing trackingId".to_string())
			})
	}
}

/// Configuration schema for HttpCourier.
pub struct HttpCourierSchema;

impl ConfigSchema for HttpCourierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("endpoint", FieldType::String)],
			vec![Field::new("api_key", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP courier implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::CourierFactory;

	fn factory() -> Self::Factory {
		create_courier
	}
}

impl crate::CourierProviderRegistry for Registry {}

/// Factory function to create an HTTP courier from configuration.
///
/// Configuration parameters:
/// - `endpoint`: partner booking URL
/// - `api_key`: bearer token for the partner (optional)
pub fn create_courier(config: &toml::Value) -> Result<Box<dyn CourierInterface>, CourierError> {
	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| CourierError::Configuration("endpoint is required".to_string()))?
		.to_string();

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.map(str::to_string);

	Ok(Box::new(HttpCourier {
		client: reqwest::Client::new(),
		endpoint,
		api_key,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factory_requires_endpoint() {
		let config = toml::Value::Table(toml::map::Map::new());
		assert!(matches!(
			create_courier(&config),
			Err(CourierError::Configuration(_))
		));
	}

	#[test]
	fn test_schema_accepts_endpoint_with_key() {
		let config: toml::Value = toml::from_str(
			"endpoint = \"https://courier.example/bookings\"\napi_key = \"secret\"",
		)
		.unwrap();
		assert!(HttpCourierSchema.validate(&config).is_ok());
	}
}
