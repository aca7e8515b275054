//! Event bus for lifecycle observability.
//!
//! A thin wrapper over a tokio broadcast channel. Publishing never
//! blocks and succeeds regardless of subscriber count at the call
//! sites' discretion: the coordinator publishes with `.ok()` since a
//! coordinator without ops subscribers is a perfectly valid deployment.

use giftflare_types::LifecycleEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying lifecycle events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
	/// Creates a new bus with the given buffered capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns Err when there are no subscribers; callers that do not
	/// care (the common case) discard the result.
	pub fn publish(
		&self,
		event: LifecycleEvent,
	) -> Result<usize, Box<broadcast::error::SendError<LifecycleEvent>>> {
		self.sender.send(event).map_err(Box::new)
	}

	/// Creates a new subscription starting at the current position.
	pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
		self.sender.subscribe()
	}
}
