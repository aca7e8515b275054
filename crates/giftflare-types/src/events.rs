//! Event types for in-process observability.
//!
//! The coordinator publishes lifecycle events on an event bus so admin
//! tooling, scheduled jobs, and tests can react to state changes and to
//! degraded side effects without coupling to the primary operations.
//! Notification and booking failures surface here as monitoring signals;
//! they never fail the operation that produced them.

use crate::{ChannelKind, NotificationKind, OrderStatus};
use serde::{Deserialize, Serialize};

/// Events emitted by the order coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
	/// A new order was persisted in Pending.
	OrderCreated { order_id: String, buyer_id: String },
	/// A status transition committed.
	StatusChanged {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// Every attempted channel for a dispatch succeeded.
	NotificationsSent {
		order_id: String,
		kind: NotificationKind,
		channels: Vec<ChannelKind>,
	},
	/// A single channel send failed after retries; the transition that
	/// triggered it already committed.
	NotificationDegraded {
		order_id: String,
		channel: ChannelKind,
		error: String,
	},
	/// Courier booking failed; the order remains in its prior status.
	BookingFailed { order_id: String, reason: String },
}
