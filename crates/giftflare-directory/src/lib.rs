//! Account/profile directory module for the Giftflare coordinator.
//!
//! The directory is the narrow interface to the platform's account
//! system: given a user id it returns the profile used to resolve
//! notification recipients. The coordinator never writes profiles.

use async_trait::async_trait;
use giftflare_types::{ConfigSchema, ImplementationRegistry, Profile};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod fixture;
	pub mod http;
}

/// Errors that can occur during directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
	/// No profile exists for the requested user.
	#[error("Profile not found: {0}")]
	NotFound(String),
	/// Error during network communication with the directory.
	#[error("Network error: {0}")]
	Network(String),
	/// Error in the implementation's configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for directory implementations.
#[async_trait]
pub trait DirectoryInterface: Send + Sync {
	/// Returns the configuration schema for this directory implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Resolves the profile for a user id.
	async fn profile(&self, user_id: &str) -> Result<Profile, DirectoryError>;
}

/// Type alias for directory factory functions.
pub type DirectoryFactory =
	fn(&toml::Value) -> Result<Box<dyn DirectoryInterface>, DirectoryError>;

/// Registry trait for directory implementations.
pub trait DirectoryRegistry: ImplementationRegistry<Factory = DirectoryFactory> {}

/// Get all registered directory implementations.
pub fn get_all_implementations() -> Vec<(&'static str, DirectoryFactory)> {
	use implementations::{fixture, http};

	vec![
		(fixture::Registry::NAME, fixture::Registry::factory()),
		(http::Registry::NAME, http::Registry::factory()),
	]
}

/// Service that manages profile lookups.
///
/// Wraps the configured directory implementation; dispatchers resolve
/// notification recipients through this service.
pub struct DirectoryService {
	implementation: Box<dyn DirectoryInterface>,
}

impl DirectoryService {
	/// Creates a new DirectoryService with the specified implementation.
	pub fn new(implementation: Box<dyn DirectoryInterface>) -> Self {
		Self { implementation }
	}

	/// Resolves the profile for a user id.
	pub async fn get_profile(&self, user_id: &str) -> Result<Profile, DirectoryError> {
		self.implementation.profile(user_id).await
	}
}
