//! Configuration module for the Giftflare order coordinator.
//!
//! This module provides structures and utilities for managing coordinator
//! configuration. It supports loading configuration from TOML files with
//! environment variable interpolation and validates that all required
//! configuration values are properly set before any component is built.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the coordinator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Order pricing rules applied at creation.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the account/profile directory.
	pub directory: DirectoryConfig,
	/// Configuration for notification channels and dispatch behavior.
	pub notifications: NotificationsConfig,
	/// Configuration for courier booking providers.
	pub couriers: CourierConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this coordinator instance.
	pub id: String,
	/// Capacity of the in-process lifecycle event bus.
	#[serde(default = "default_event_capacity")]
	pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
	1000
}

/// Order pricing rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Surcharge in minor currency units added per gift-packaged line
	/// item (the storefront charges Rs. 50).
	#[serde(default = "default_gift_packaging_surcharge")]
	pub gift_packaging_surcharge: u64,
}

fn default_gift_packaging_surcharge() -> u64 {
	5_000
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			gift_packaging_surcharge: default_gift_packaging_surcharge(),
		}
	}
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of store implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the account/profile directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of directory implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for notification channels and dispatch behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationsConfig {
	/// Map of channel implementation names to their configurations.
	/// Each configured channel is attempted independently per dispatch.
	pub channels: HashMap<String, toml::Value>,
	/// Timeout applied to every single channel send.
	#[serde(default = "default_send_timeout_seconds")]
	pub send_timeout_seconds: u64,
	/// Maximum attempts per channel send, including the first.
	#[serde(default = "default_retry_max_attempts")]
	pub retry_max_attempts: u32,
	/// Base delay for exponential backoff between attempts.
	#[serde(default = "default_retry_base_delay_ms")]
	pub retry_base_delay_ms: u64,
}

fn default_send_timeout_seconds() -> u64 {
	10
}

fn default_retry_max_attempts() -> u32 {
	3
}

fn default_retry_base_delay_ms() -> u64 {
	200
}

/// Configuration for courier booking providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourierConfig {
	/// Map of courier implementation names to their configurations.
	/// Each implementation declares the delivery types it serves via a
	/// `delivery_types` array.
	pub implementations: HashMap<String, toml::Value>,
	/// Timeout applied to every booking call.
	#[serde(default = "default_booking_timeout_seconds")]
	pub booking_timeout_seconds: u64,
}

fn default_booking_timeout_seconds() -> u64 {
	15
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			}
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated before being returned.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}
		if self.service.event_capacity == 0 {
			return Err(ConfigError::Validation(
				"service.event_capacity must be greater than 0".into(),
			));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate directory config
		if self.directory.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one directory implementation must be configured".into(),
			));
		}
		if !self
			.directory
			.implementations
			.contains_key(&self.directory.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary directory '{}' not found in implementations",
				self.directory.primary
			)));
		}

		// Validate notifications config
		if self.notifications.channels.is_empty() {
			return Err(ConfigError::Validation(
				"At least one notification channel required".into(),
			));
		}
		if self.notifications.retry_max_attempts == 0 {
			return Err(ConfigError::Validation(
				"notifications.retry_max_attempts must be at least 1".into(),
			));
		}
		if self.notifications.retry_max_attempts > 10 {
			return Err(ConfigError::Validation(
				"notifications.retry_max_attempts cannot exceed 10".into(),
			));
		}
		if self.notifications.send_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"notifications.send_timeout_seconds must be greater than 0".into(),
			));
		}

		// Validate courier config
		if self.couriers.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one courier implementation required".into(),
			));
		}
		if self.couriers.booking_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"couriers.booking_timeout_seconds must be greater than 0".into(),
			));
		}
		self.validate_courier_coverage()?;

		Ok(())
	}

	/// Validates courier delivery-type coverage.
	///
	/// Every courier implementation must declare the delivery types it
	/// serves, each declared type must be known, and no two
	/// implementations may cover the same type: the courier service
	/// routes a booking by delivery type and the route must be
	/// unambiguous.
	fn validate_courier_coverage(&self) -> Result<(), ConfigError> {
		let mut coverage: HashMap<String, String> = HashMap::new();

		for (impl_name, impl_config) in &self.couriers.implementations {
			let delivery_types = impl_config
				.get("delivery_types")
				.and_then(|v| v.as_array())
				.ok_or_else(|| {
					ConfigError::Validation(format!(
						"Courier implementation '{}' missing 'delivery_types' field",
						impl_name
					))
				})?;

			if delivery_types.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Courier implementation '{}' declares no delivery types",
					impl_name
				)));
			}

			for type_value in delivery_types {
				let delivery_type = type_value.as_str().ok_or_else(|| {
					ConfigError::Validation(format!(
						"Invalid delivery type in courier '{}'",
						impl_name
					))
				})?;

				if delivery_type != "standard" && delivery_type != "instant" {
					return Err(ConfigError::Validation(format!(
						"Courier '{}' declares unknown delivery type '{}'",
						impl_name, delivery_type
					)));
				}

				if let Some(existing) =
					coverage.insert(delivery_type.to_string(), impl_name.clone())
				{
					return Err(ConfigError::Validation(format!(
						"Duplicate courier coverage for delivery type '{}': '{}' and '{}'",
						delivery_type, existing, impl_name
					)));
				}
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn minimal_config() -> &'static str {
		r#"
[service]
id = "giftflare-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[directory]
primary = "fixture"
[directory.implementations.fixture]

[notifications]
[notifications.channels.log]

[couriers]
[couriers.implementations.simulated]
delivery_types = ["standard", "instant"]
"#
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_SMS_HOST", "sms.example");
		std::env::set_var("TEST_SMS_PORT", "8443");

		let input = "endpoint = \"${TEST_SMS_HOST}:${TEST_SMS_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "endpoint = \"sms.example:8443\"");

		std::env::remove_var("TEST_SMS_HOST");
		std::env::remove_var("TEST_SMS_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_parses_with_defaults() {
		let config: Config = minimal_config().parse().unwrap();
		assert_eq!(config.service.id, "giftflare-test");
		assert_eq!(config.service.event_capacity, 1000);
		assert_eq!(config.pricing.gift_packaging_surcharge, 5_000);
		assert_eq!(config.notifications.send_timeout_seconds, 10);
		assert_eq!(config.notifications.retry_max_attempts, 3);
		assert_eq!(config.couriers.booking_timeout_seconds, 15);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = minimal_config().replace("primary = \"memory\"", "primary = \"redis\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'redis' not found"));
	}

	#[test]
	fn test_duplicate_courier_coverage_rejected() {
		let config_str = format!(
			"{}\n[couriers.implementations.dunzo]\ndelivery_types = [\"instant\"]\n",
			minimal_config()
		);
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		let error_msg = result.unwrap_err().to_string();
		assert!(
			error_msg.contains("Duplicate courier coverage") && error_msg.contains("instant"),
			"unexpected error: {}",
			error_msg
		);
	}

	#[test]
	fn test_unknown_delivery_type_rejected() {
		let config_str = minimal_config().replace(
			"delivery_types = [\"standard\", \"instant\"]",
			"delivery_types = [\"drone\"]",
		);
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("unknown delivery type 'drone'"));
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_SERVICE_ID", "giftflare-env");

		let config_str = minimal_config().replace(
			"id = \"giftflare-test\"",
			"id = \"${TEST_SERVICE_ID}\"",
		);
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.service.id, "giftflare-env");

		std::env::remove_var("TEST_SERVICE_ID");
	}
}
