//! HTTP directory implementation.
//!
//! Resolves profiles from the platform's account service over REST:
//! `GET {base_url}/profiles/{id}`. Lookups carry an explicit timeout so
//! a slow account service degrades a notification, never a transition.

use crate::{DirectoryError, DirectoryInterface};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Field, FieldType, Profile, Schema, ValidationError};
use std::time::Duration;

/// Directory backed by the account service's HTTP API.
pub struct HttpDirectory {
	client: reqwest::Client,
	base_url: String,
}

impl HttpDirectory {
	/// Creates a new HttpDirectory against the given base URL.
	pub fn new(base_url: String, timeout: Duration) -> Result<Self, DirectoryError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| DirectoryError::Configuration(e.to_string()))?;

		Ok(Self { client, base_url })
	}
}

#[async_trait]
impl DirectoryInterface for HttpDirectory {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpDirectorySchema)
	}

	async fn profile(&self, user_id: &str) -> Result<Profile, DirectoryError> {
		let url = format!("{}/profiles/{}", self.base_url.trim_end_matches('/'), user_id);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| DirectoryError::Network(e.to_string()))?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Err(DirectoryError::NotFound(user_id.to_string()));
		}
		if !response.status().is_success() {
			return Err(DirectoryError::Network(format!(
				"directory returned {}",
				response.status()
			)));
		}

		response
			.json::<Profile>()
			.await
			.map_err(|e| DirectoryError::Network(e.to_string()))
	}
}

/// Configuration schema for HttpDirectory.
pub struct HttpDirectorySchema;

impl ConfigSchema for HttpDirectorySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String)],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(120),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP directory implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::DirectoryFactory;

	fn factory() -> Self::Factory {
		create_directory
	}
}

impl crate::DirectoryRegistry for Registry {}

/// Factory function to create an HTTP directory from configuration.
///
/// Configuration parameters:
/// - `base_url`: account service root, e.g. "https://accounts.internal"
/// - `timeout_seconds`: per-lookup timeout (default: 5)
pub fn create_directory(
	config: &toml::Value,
) -> Result<Box<dyn DirectoryInterface>, DirectoryError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DirectoryError::Configuration("base_url is required".to_string()))?
		.to_string();

	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(5) as u64;

	Ok(Box::new(HttpDirectory::new(
		base_url,
		Duration::from_secs(timeout_seconds),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factory_requires_base_url() {
		let config = toml::Value::Table(toml::map::Map::new());
		let result = create_directory(&config);
		assert!(matches!(result, Err(DirectoryError::Configuration(_))));
	}

	#[test]
	fn test_schema_rejects_bad_timeout() {
		let config: toml::Value =
			toml::from_str("base_url = \"https://accounts.internal\"\ntimeout_seconds = 0")
				.unwrap();
		let schema = HttpDirectorySchema;
		assert!(schema.validate(&config).is_err());
	}
}
