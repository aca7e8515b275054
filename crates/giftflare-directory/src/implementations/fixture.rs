//! Config-seeded directory implementation.
//!
//! Profiles are declared directly in the TOML configuration, which is
//! enough for development and for test environments that do not run the
//! real account system.

use crate::{DirectoryError, DirectoryInterface};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Profile, Schema, ValidationError};
use std::collections::HashMap;

/// Directory backed by a fixed set of profiles from configuration.
pub struct FixtureDirectory {
	profiles: HashMap<String, Profile>,
}

impl FixtureDirectory {
	/// Creates a directory from a list of profiles.
	pub fn new(profiles: Vec<Profile>) -> Self {
		Self {
			profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
		}
	}
}

#[async_trait]
impl DirectoryInterface for FixtureDirectory {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixtureDirectorySchema)
	}

	async fn profile(&self, user_id: &str) -> Result<Profile, DirectoryError> {
		self.profiles
			.get(user_id)
			.cloned()
			.ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))
	}
}

/// Configuration schema for FixtureDirectory.
///
/// The `profiles` array is validated structurally during factory
/// deserialization, so the schema itself has nothing required.
pub struct FixtureDirectorySchema;

impl ConfigSchema for FixtureDirectorySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry for the fixture directory implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "fixture";
	type Factory = crate::DirectoryFactory;

	fn factory() -> Self::Factory {
		create_directory
	}
}

impl crate::DirectoryRegistry for Registry {}

/// Factory function to create a fixture directory from configuration.
///
/// Configuration parameters:
/// - `profiles`: array of profile tables (id, name, email, role, city)
pub fn create_directory(
	config: &toml::Value,
) -> Result<Box<dyn DirectoryInterface>, DirectoryError> {
	let profiles: Vec<Profile> = match config.get("profiles") {
		Some(value) => value
			.clone()
			.try_into()
			.map_err(|e: toml::de::Error| DirectoryError::Configuration(e.to_string()))?,
		None => Vec::new(),
	};

	Ok(Box::new(FixtureDirectory::new(profiles)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use giftflare_types::ProfileRole;

	#[tokio::test]
	async fn test_lookup_from_config() {
		let config: toml::Value = toml::from_str(
			r#"
[[profiles]]
id = "buyer-1"
name = "Asha"
email = "asha@example.com"
role = "buyer"
city = "Bengaluru"
"#,
		)
		.unwrap();

		let directory = create_directory(&config).unwrap();
		let profile = directory.profile("buyer-1").await.unwrap();
		assert_eq!(profile.email, "asha@example.com");
		assert_eq!(profile.role, ProfileRole::Buyer);

		let missing = directory.profile("buyer-2").await;
		assert!(matches!(missing, Err(DirectoryError::NotFound(id)) if id == "buyer-2"));
	}

	#[tokio::test]
	async fn test_empty_config_yields_empty_directory() {
		let config = toml::Value::Table(toml::map::Map::new());
		let directory = create_directory(&config).unwrap();
		assert!(directory.profile("anyone").await.is_err());
	}
}
