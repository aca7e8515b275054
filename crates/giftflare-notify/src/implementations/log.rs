//! Log-only channel for development.
//!
//! Writes every message to the tracing output instead of a provider.
//! Useful in development configurations and for demos without email/SMS
//! credentials.

use crate::{ChannelError, ChannelInterface};
use async_trait::async_trait;
use giftflare_types::{
	ChannelKind, ConfigSchema, Field, FieldType, OutboundMessage, Schema, ValidationError,
};

/// Channel that logs messages instead of sending them.
pub struct LogChannel {
	kind: ChannelKind,
}

#[async_trait]
impl ChannelInterface for LogChannel {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogChannelSchema)
	}

	fn kind(&self) -> ChannelKind {
		self.kind
	}

	async fn send(&self, recipient: &str, message: &OutboundMessage) -> Result<(), ChannelError> {
		tracing::info!(
			channel = %self.kind,
			recipient,
			subject = message.subject.as_deref().unwrap_or(""),
			body = %message.body,
			"Notification (log channel)"
		);
		Ok(())
	}
}

/// Configuration schema for LogChannel.
pub struct LogChannelSchema;

impl ConfigSchema for LogChannelSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("channel", FieldType::String)]);
		schema.validate(config)
	}
}

/// Registry for the log channel implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::ChannelFactory;

	fn factory() -> Self::Factory {
		create_channel
	}
}

impl crate::ChannelRegistry for Registry {}

/// Factory function to create a log channel from configuration.
///
/// Configuration parameters:
/// - `channel`: which medium to stand in for, "email" or "sms" (default: "email")
pub fn create_channel(config: &toml::Value) -> Result<Box<dyn ChannelInterface>, ChannelError> {
	let kind = match config.get("channel").and_then(|v| v.as_str()) {
		None | Some("email") => ChannelKind::Email,
		Some("sms") => ChannelKind::Sms,
		Some(other) => {
			return Err(ChannelError::Configuration(format!(
				"unknown channel '{}'",
				other
			)))
		}
	};

	Ok(Box::new(LogChannel { kind }))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_log_channel_always_succeeds() {
		let config = toml::Value::Table(toml::map::Map::new());
		let channel = create_channel(&config).unwrap();
		assert_eq!(channel.kind(), ChannelKind::Email);

		let message = OutboundMessage {
			subject: Some("Order #A1B2C3D4 confirmed".into()),
			body: "Your order is confirmed.".into(),
		};
		assert!(channel.send("asha@example.com", &message).await.is_ok());
	}

	#[test]
	fn test_unknown_channel_kind_rejected() {
		let config: toml::Value = toml::from_str("channel = \"pigeon\"").unwrap();
		assert!(matches!(
			create_channel(&config),
			Err(ChannelError::Configuration(_))
		));
	}
}
