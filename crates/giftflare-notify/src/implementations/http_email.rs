//! Email channel backed by an HTTP mail provider.
//!
//! Posts rendered messages as JSON to the provider's send endpoint. The
//! provider is treated as unreliable and possibly slow; the dispatcher
//! wraps every call in its own timeout and retry.

use crate::{ChannelError, ChannelInterface};
use async_trait::async_trait;
use giftflare_types::{
	ChannelKind, ConfigSchema, Field, FieldType, OutboundMessage, Schema, ValidationError,
};

/// Email channel speaking a JSON POST API.
pub struct HttpEmailChannel {
	client: reqwest::Client,
	endpoint: String,
	api_key: Option<String>,
	from: String,
}

#[async_trait]
impl ChannelInterface for HttpEmailChannel {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpEmailSchema)
	}

	fn kind(&self) -> ChannelKind {
		ChannelKind::Email
	}

	async fn send(&self, recipient: &str, message: &OutboundMessage) -> Result<(), ChannelError> {
		let payload = serde_json::json!({
			"from": self.from,
			"to": recipient,
			"subject": message.subject,
			"body": message.body,
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
			status if status.is_client_error() => Err(ChannelError::Rejected(format!(
				"mail provider returned {}",
				status
			))),
			status => Err(ChannelError::Provider(format!(
				"mail provider returned {}",
				status
			))),
		}
	}
}

/// Configuration schema for HttpEmailChannel.
pub struct HttpEmailSchema;

impl ConfigSchema for HttpEmailSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("endpoint", FieldType::String),
				Field::new("from", FieldType::String),
			],
			vec![Field::new("api_key", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP email channel implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http_email";
	type Factory = crate::ChannelFactory;

	fn factory() -> Self::Factory {
		create_channel
	}
}

impl crate::ChannelRegistry for Registry {}

/// Factory function to create an email channel from configuration.
///
/// Configuration parameters:
/// - `endpoint`: provider send URL
/// - `from`: sender address shown to the buyer
/// - `api_key`: bearer token for the provider (optional)
pub fn create_channel(config: &toml::Value) -> Result<Box<dyn ChannelInterface>, ChannelError> {
	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ChannelError::Configuration("endpoint is required".to_string()))?
		.to_string();

	let from = config
		.get("from")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ChannelError::Configuration("from is required".to_string()))?
		.to_string();

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.map(str::to_string);

	let client = reqwest::Client::new();

	Ok(Box::new(HttpEmailChannel {
		client,
		endpoint,
		api_key,
		from,
	}))
}
