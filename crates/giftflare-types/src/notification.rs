//! Notification channel and dispatch types.
//!
//! A notification is a (channel, message, recipient) tuple produced once
//! per lifecycle step per channel. Channels fail and succeed
//! independently; the dispatch report aggregates every outcome so callers
//! and observability tooling can distinguish "everything succeeded" from
//! "primary succeeded, notification degraded".

use serde::{Deserialize, Serialize};
use std::fmt;

/// An independent outbound notification medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
	Email,
	Sms,
}

impl fmt::Display for ChannelKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChannelKind::Email => write!(f, "email"),
			ChannelKind::Sms => write!(f, "sms"),
		}
	}
}

/// Lifecycle step a notification announces.
///
/// `Placed` fires once at order creation; the remaining kinds fire on
/// their status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
	Placed,
	Confirmed,
	Shipped,
	Delivered,
	Cancelled,
}

impl fmt::Display for NotificationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NotificationKind::Placed => write!(f, "placed"),
			NotificationKind::Confirmed => write!(f, "confirmed"),
			NotificationKind::Shipped => write!(f, "shipped"),
			NotificationKind::Delivered => write!(f, "delivered"),
			NotificationKind::Cancelled => write!(f, "cancelled"),
		}
	}
}

/// A rendered message ready to hand to a channel implementation.
///
/// Email channels use both fields; SMS channels ignore the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
	pub body: String,
}

/// Outcome of one channel attempt within a dispatch.
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
	pub channel: ChannelKind,
	pub recipient: String,
	/// Error text when the send degraded; None on success.
	pub error: Option<String>,
}

/// Aggregated result of fanning one notification out across channels.
///
/// Dispatch never fails as a whole: channels without a resolvable
/// recipient are skipped, failed sends are recorded, and the caller's
/// primary operation proceeds regardless.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
	pub outcomes: Vec<ChannelOutcome>,
	/// Channels skipped because no recipient could be resolved.
	pub skipped: Vec<ChannelKind>,
}

impl DispatchReport {
	/// True when every attempted channel succeeded.
	pub fn fully_delivered(&self) -> bool {
		self.outcomes.iter().all(|o| o.error.is_none())
	}

	/// Outcomes that degraded, for logging and event publication.
	pub fn failures(&self) -> impl Iterator<Item = &ChannelOutcome> {
		self.outcomes.iter().filter(|o| o.error.is_some())
	}

	/// Channels that were attempted and succeeded.
	pub fn delivered_channels(&self) -> Vec<ChannelKind> {
		self.outcomes
			.iter()
			.filter(|o| o.error.is_none())
			.map(|o| o.channel)
			.collect()
	}
}
