//! Notification dispatch module for the Giftflare coordinator.
//!
//! This module translates an (order, lifecycle step) pair into outbound
//! messages across independent channels and attempts each one. Channels
//! fail independently: a provider timeout on one never prevents another
//! from being attempted, and no channel failure ever reaches the caller
//! of a status transition.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures::future::join_all;
use giftflare_directory::DirectoryService;
use giftflare_types::{
	ChannelKind, ChannelOutcome, ConfigSchema, DispatchReport, ImplementationRegistry,
	NotificationKind, Order, OutboundMessage,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod templates;

/// Re-export implementations
pub mod implementations {
	pub mod http_email;
	pub mod http_sms;
	pub mod log;
}

/// Errors that can occur during a single channel send.
///
/// These never propagate past the dispatcher; they are aggregated into
/// the dispatch report.
#[derive(Debug, Error)]
pub enum ChannelError {
	/// The provider did not answer within the send timeout.
	#[error("Send timed out")]
	Timeout,
	/// The provider answered with a failure.
	#[error("Provider error: {0}")]
	Provider(String),
	/// The provider rejected the recipient or payload.
	#[error("Rejected: {0}")]
	Rejected(String),
	/// Error in the implementation's configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for notification channel implementations.
#[async_trait]
pub trait ChannelInterface: Send + Sync {
	/// Returns the configuration schema for this channel implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Which medium this channel delivers over.
	fn kind(&self) -> ChannelKind;

	/// Sends one rendered message to one recipient.
	async fn send(&self, recipient: &str, message: &OutboundMessage) -> Result<(), ChannelError>;
}

/// Type alias for channel factory functions.
pub type ChannelFactory = fn(&toml::Value) -> Result<Box<dyn ChannelInterface>, ChannelError>;

/// Registry trait for channel implementations.
pub trait ChannelRegistry: ImplementationRegistry<Factory = ChannelFactory> {}

/// Get all registered channel implementations.
pub fn get_all_implementations() -> Vec<(&'static str, ChannelFactory)> {
	use implementations::{http_email, http_sms, log};

	vec![
		(http_email::Registry::NAME, http_email::Registry::factory()),
		(http_sms::Registry::NAME, http_sms::Registry::factory()),
		(log::Registry::NAME, log::Registry::factory()),
	]
}

/// Bounded retry behavior for a single channel send.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	/// Total attempts per send, including the first.
	pub max_attempts: u32,
	/// Base delay for exponential backoff between attempts.
	pub base_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
		}
	}
}

/// Service that fans a notification out across the configured channels.
///
/// Recipient resolution: email comes from the buyer's profile in the
/// account directory; SMS uses the delivery address phone number and is
/// silently skipped when the order has none. All resolved channels are
/// attempted concurrently and every outcome is collected; the service
/// itself never fails.
pub struct NotificationService {
	channels: Vec<Box<dyn ChannelInterface>>,
	directory: Arc<DirectoryService>,
	send_timeout: Duration,
	retry: RetryPolicy,
}

impl NotificationService {
	/// Creates a new NotificationService.
	pub fn new(
		channels: Vec<Box<dyn ChannelInterface>>,
		directory: Arc<DirectoryService>,
		send_timeout: Duration,
		retry: RetryPolicy,
	) -> Self {
		Self {
			channels,
			directory,
			send_timeout,
			retry,
		}
	}

	/// Dispatches the notification for one lifecycle step of one order.
	pub async fn notify(&self, order: &Order, kind: NotificationKind) -> DispatchReport {
		let mut report = DispatchReport::default();

		// Resolve the email recipient once; a directory failure degrades
		// every email channel for this dispatch but nothing else.
		let email_recipient = match self.directory.get_profile(&order.buyer_id).await {
			Ok(profile) => Ok(profile.email),
			Err(e) => Err(e.to_string()),
		};
		let sms_recipient = order.delivery_address.phone.clone();

		let mut sends = Vec::new();
		for channel in &self.channels {
			let (recipient, message) = match channel.kind() {
				ChannelKind::Email => match &email_recipient {
					Ok(email) => (email.clone(), templates::email_message(order, kind)),
					Err(reason) => {
						report.outcomes.push(ChannelOutcome {
							channel: ChannelKind::Email,
							recipient: order.buyer_id.clone(),
							error: Some(format!("recipient lookup failed: {}", reason)),
						});
						continue;
					}
				},
				ChannelKind::Sms => match &sms_recipient {
					Some(phone) => (phone.clone(), templates::sms_message(order, kind)),
					// No phone on the order is not an error
					None => {
						report.skipped.push(ChannelKind::Sms);
						continue;
					}
				},
			};

			sends.push(self.attempt_send(channel.as_ref(), recipient, message));
		}

		report.outcomes.extend(join_all(sends).await);

		for failure in report.failures() {
			tracing::warn!(
				order_id = %giftflare_types::truncate_id(&order.id),
				channel = %failure.channel,
				kind = %kind,
				error = failure.error.as_deref().unwrap_or(""),
				"Notification channel degraded"
			);
		}

		report
	}

	/// Attempts one channel send with timeout and bounded backoff retry.
	async fn attempt_send(
		&self,
		channel: &dyn ChannelInterface,
		recipient: String,
		message: OutboundMessage,
	) -> ChannelOutcome {
		let mut backoff = ExponentialBackoff {
			initial_interval: self.retry.base_delay,
			max_elapsed_time: None,
			..ExponentialBackoff::default()
		};

		let mut last_error = None;
		for attempt in 1..=self.retry.max_attempts {
			let result = tokio::time::timeout(self.send_timeout, channel.send(&recipient, &message))
				.await
				.unwrap_or(Err(ChannelError::Timeout));

			match result {
				Ok(()) => {
					return ChannelOutcome {
						channel: channel.kind(),
						recipient,
						error: None,
					};
				}
				Err(e) => {
					tracing::debug!(
						channel = %channel.kind(),
						attempt,
						error = %e,
						"Channel send attempt failed"
					);
					last_error = Some(e.to_string());
				}
			}

			if attempt < self.retry.max_attempts {
				let delay = backoff.next_backoff().unwrap_or(self.retry.base_delay);
				tokio::time::sleep(delay).await;
			}
		}

		ChannelOutcome {
			channel: channel.kind(),
			recipient,
			error: last_error,
		}
	}
}
