//! Profile types resolved through the account directory.

use serde::{Deserialize, Serialize};

/// Role of an account on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
	Buyer,
	Seller,
	Admin,
}

/// An account profile as returned by the directory collaborator.
///
/// The coordinator only uses `email` (notification recipient) and `city`
/// (instant-delivery eligibility, decided upstream); the rest is carried
/// for admin tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
	pub id: String,
	pub name: String,
	pub email: String,
	pub role: ProfileRole,
	pub city: String,
}
