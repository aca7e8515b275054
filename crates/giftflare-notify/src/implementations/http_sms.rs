//! SMS channel backed by an HTTP gateway.
//!
//! Posts the rendered body to the gateway's message endpoint. Subjects
//! are ignored; templates keep SMS bodies short.

use crate::{ChannelError, ChannelInterface};
use async_trait::async_trait;
use giftflare_types::{
	ChannelKind, ConfigSchema, Field, FieldType, OutboundMessage, Schema, ValidationError,
};

/// SMS channel speaking a JSON POST API.
pub struct HttpSmsChannel {
	client: reqwest::Client,
	endpoint: String,
	api_key: Option<String>,
	sender_id: String,
}

#[async_trait]
impl ChannelInterface for HttpSmsChannel {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpSmsSchema)
	}

	fn kind(&self) -> ChannelKind {
		ChannelKind::Sms
	}

	async fn send(&self, recipient: &str, message: &OutboundMessage) -> Result<(), ChannelError> {
		let payload = serde_json::json!({
			"sender": self.sender_id,
			"to": recipient,
			"message": message.body,
		});

		let mut request = self.client.post(&self.endpoint).json(&payload);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| ChannelError::Provider(e.to_string()))?;

		match response.status() {
			status if status.is_success() => Ok(()),
			// Malformed numbers come back as client errors
			status if status.is_client_error() => Err(ChannelError::Rejected(format!(
				"sms gateway returned {}",
				status
			))),
			status => Err(ChannelError::Provider(format!(
				"sms gateway returned {}",
				status
			))),
		}
	}
}

/// Configuration schema for HttpSmsChannel.
pub struct HttpSmsSchema;

impl ConfigSchema for HttpSmsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("endpoint", FieldType::String)],
			vec![
				Field::new("api_key", FieldType::String),
				Field::new("sender_id", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP SMS channel implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http_sms";
	type Factory = crate::ChannelFactory;

	fn factory() -> Self::Factory {
		create_channel
	}
}

impl crate::ChannelRegistry for Registry {}

/// Factory function to create an SMS channel from configuration.
///
/// Configuration parameters:
/// - `endpoint`: gateway message URL
/// - `api_key`: bearer token for the gateway (optional)
/// - `sender_id`: alphanumeric sender shown on the handset (default: "GIFTFLARE")
pub fn create_channel(config: &toml::Value) -> Result<Box<dyn ChannelInterface>, ChannelError> {
	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ChannelError::Configuration("endpoint is required".to_string()))?
		.to_string();

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.map(str::to_string);

	let sender_id = config
		.get("sender_id")
		.and_then(|v| v.as_str())
		.unwrap_or("GIFTFLARE")
		.to_string();

	Ok(Box::new(HttpSmsChannel {
		client: reqwest::Client::new(),
		endpoint,
		api_key,
		sender_id,
	}))
}
