//! Order coordinator engine.
//!
//! The OrderCoordinator owns the five operations exposed to the rest of
//! the platform: create, read, list, transition, and book-delivery. It is
//! an explicit component instance constructed with injected dependencies
//! (store handle, notification service, courier service, event bus) so
//! tests substitute fakes without any global state.
//!
//! Transition semantics: the engine validates the target against the
//! state machine, performs one conditional write through the store, and
//! only after the durable update commits does it invoke the notification
//! dispatcher - exactly once per performed transition. Notification
//! failure never rolls back or fails a transition.

pub mod event_bus;

use crate::{pricing, state, BookingError, BuildError, LifecycleError};
use event_bus::EventBus;
use giftflare_config::{Config, PricingConfig};
use giftflare_courier::{CourierFactory, CourierInterface, CourierService};
use giftflare_directory::{DirectoryFactory, DirectoryService};
use giftflare_notify::{ChannelFactory, ChannelInterface, NotificationService, RetryPolicy};
use giftflare_storage::{OrderStore, StatusChange, StoreError, StoreFactory};
use giftflare_types::{
	current_timestamp, truncate_id, DeliveryType, LifecycleEvent, NewOrder, NotificationKind,
	Order, OrderStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Maps a target status to the notification it triggers.
///
/// Pending has no entry: nothing transitions back to Pending, and the
/// creation-time notification is the separate Placed kind.
fn notification_kind(status: OrderStatus) -> Option<NotificationKind> {
	match status {
		OrderStatus::Confirmed => Some(NotificationKind::Confirmed),
		OrderStatus::Shipped => Some(NotificationKind::Shipped),
		OrderStatus::Delivered => Some(NotificationKind::Delivered),
		OrderStatus::Cancelled => Some(NotificationKind::Cancelled),
		OrderStatus::Pending => None,
	}
}

fn map_store_error(e: StoreError, order_id: &str) -> LifecycleError {
	match e {
		StoreError::NotFound => LifecycleError::NotFound(order_id.to_string()),
		StoreError::Conflict { current } => LifecycleError::Conflict { current },
		other => LifecycleError::Storage(other.to_string()),
	}
}

/// Main coordinator for the order lifecycle.
pub struct OrderCoordinator {
	pricing: PricingConfig,
	store: Arc<OrderStore>,
	notifier: Arc<NotificationService>,
	couriers: Arc<CourierService>,
	event_bus: EventBus,
}

impl OrderCoordinator {
	/// Creates a coordinator from its injected dependencies.
	pub fn new(
		pricing: PricingConfig,
		store: Arc<OrderStore>,
		notifier: Arc<NotificationService>,
		couriers: Arc<CourierService>,
		event_bus: EventBus,
	) -> Self {
		Self {
			pricing,
			store,
			notifier,
			couriers,
			event_bus,
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Creates a new order in Pending and dispatches the order-placed
	/// notification exactly once.
	///
	/// The total is computed here from the item snapshots; the input type
	/// has no way to carry a caller-supplied total.
	pub async fn create_order(&self, input: NewOrder) -> Result<Order, LifecycleError> {
		pricing::validate_new_order(&input)?;
		let total_amount = pricing::compute_total(&input, &self.pricing)?;

		let now = current_timestamp();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			buyer_id: input.buyer_id,
			items: input.items,
			total_amount,
			delivery_type: input.delivery_type,
			delivery_address: input.delivery_address,
			friend_delivery: input.friend_delivery,
			status: OrderStatus::Pending,
			tracking_number: None,
			payment_reference: input.payment_reference,
			created_at: now,
			updated_at: now,
		};

		self.store
			.insert(&order)
			.await
			.map_err(|e| map_store_error(e, &order.id))?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			buyer_id = %order.buyer_id,
			total_amount = order.total_amount,
			delivery_type = %order.delivery_type,
			"Order created"
		);
		self.event_bus
			.publish(LifecycleEvent::OrderCreated {
				order_id: order.id.clone(),
				buyer_id: order.buyer_id.clone(),
			})
			.ok();

		self.dispatch(&order, NotificationKind::Placed).await;

		Ok(order)
	}

	/// Retrieves an order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, LifecycleError> {
		self.store
			.get(order_id)
			.await
			.map_err(|e| map_store_error(e, order_id))
	}

	/// Lists a buyer's orders, newest first.
	pub async fn list_orders_for_buyer(
		&self,
		buyer_id: &str,
	) -> Result<Vec<Order>, LifecycleError> {
		self.store
			.list_for_buyer(buyer_id)
			.await
			.map_err(|e| map_store_error(e, buyer_id))
	}

	/// Moves an order to a new status.
	///
	/// Shipping requires a non-empty tracking number. A target equal to
	/// the current status is an idempotent no-op that re-sends nothing,
	/// which absorbs duplicate courier/payment webhooks. The durable
	/// update is one conditional write; losing the race to a different
	/// target surfaces as Conflict for the caller to retry.
	pub async fn transition(
		&self,
		order_id: &str,
		target: OrderStatus,
		tracking_number: Option<String>,
	) -> Result<Order, LifecycleError> {
		let tracking = match target {
			OrderStatus::Shipped => {
				let tracking = tracking_number
					.filter(|t| !t.trim().is_empty())
					.ok_or_else(|| {
						LifecycleError::Validation(
							"shipping requires a tracking number".to_string(),
						)
					})?;
				Some(tracking)
			}
			_ => None,
		};

		let current = self.get_order(order_id).await?;

		if current.status == target {
			return Ok(current);
		}

		if !state::is_valid_transition(current.status, target) {
			return Err(LifecycleError::IllegalTransition {
				from: current.status,
				to: target,
			});
		}

		let change = StatusChange {
			status: target,
			tracking_number: tracking,
			updated_at: current_timestamp(),
		};

		let updated = match self
			.store
			.apply_transition(order_id, current.status, change)
			.await
		{
			Ok(order) => order,
			Err(StoreError::Conflict { current: now }) if now == target => {
				// A concurrent caller performed this exact transition
				// first; it owns the notifications.
				return self.get_order(order_id).await;
			}
			Err(e) => return Err(map_store_error(e, order_id)),
		};

		tracing::info!(
			order_id = %truncate_id(order_id),
			from = %current.status,
			to = %target,
			"Order transitioned"
		);
		self.event_bus
			.publish(LifecycleEvent::StatusChanged {
				order_id: updated.id.clone(),
				from: current.status,
				to: target,
			})
			.ok();

		if let Some(kind) = notification_kind(target) {
			self.dispatch(&updated, kind).await;
		}

		Ok(updated)
	}

	/// Books a courier for a confirmed order and ships it with the
	/// returned tracking number.
	///
	/// On booking failure the order stays Confirmed and the error is
	/// returned to whoever initiated the booking; re-attempting is the
	/// caller's decision, not an in-process retry loop.
	pub async fn book_delivery(&self, order_id: &str) -> Result<Order, BookingError> {
		let order = self
			.get_order(order_id)
			.await
			.map_err(BookingError::Lifecycle)?;

		if order.status != OrderStatus::Confirmed {
			return Err(LifecycleError::IllegalTransition {
				from: order.status,
				to: OrderStatus::Shipped,
			}
			.into());
		}

		let tracking = match self.couriers.book(&order).await {
			Ok(tracking) => tracking,
			Err(e) => {
				tracing::warn!(
					order_id = %truncate_id(order_id),
					error = %e,
					"Courier booking failed"
				);
				self.event_bus
					.publish(LifecycleEvent::BookingFailed {
						order_id: order.id.clone(),
						reason: e.to_string(),
					})
					.ok();
				return Err(e.into());
			}
		};

		tracing::info!(
			order_id = %truncate_id(order_id),
			tracking_number = %tracking,
			"Courier booked"
		);

		Ok(self
			.transition(order_id, OrderStatus::Shipped, Some(tracking))
			.await?)
	}

	/// Runs the dispatcher for one lifecycle step and publishes the
	/// outcome as events. Infallible: degraded channels become
	/// monitoring signals, not errors.
	async fn dispatch(&self, order: &Order, kind: NotificationKind) {
		let report = self.notifier.notify(order, kind).await;

		let delivered = report.delivered_channels();
		if !delivered.is_empty() {
			self.event_bus
				.publish(LifecycleEvent::NotificationsSent {
					order_id: order.id.clone(),
					kind,
					channels: delivered,
				})
				.ok();
		}
		for failure in report.failures() {
			self.event_bus
				.publish(LifecycleEvent::NotificationDegraded {
					order_id: order.id.clone(),
					channel: failure.channel,
					error: failure.error.clone().unwrap_or_default(),
				})
				.ok();
		}
	}
}

/// Factory functions for every pluggable implementation, keyed by the
/// names used in configuration.
pub struct CoordinatorFactories {
	pub store_factories: HashMap<String, StoreFactory>,
	pub directory_factories: HashMap<String, DirectoryFactory>,
	pub channel_factories: HashMap<String, ChannelFactory>,
	pub courier_factories: HashMap<String, CourierFactory>,
}

/// Builder constructing an OrderCoordinator from configuration.
///
/// The store and directory are load-bearing and fail the build when they
/// cannot be created; channels and couriers are loaded individually and
/// invalid ones are skipped with an error log, since a coordinator with a
/// degraded notification setup is still able to move orders.
pub struct CoordinatorBuilder {
	config: Config,
}

impl CoordinatorBuilder {
	/// Creates a new builder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the coordinator using the provided factories.
	pub fn build(self, factories: CoordinatorFactories) -> Result<OrderCoordinator, BuildError> {
		let config = self.config;

		// Create the order store
		let store_name = &config.storage.primary;
		let store_config = config
			.storage
			.implementations
			.get(store_name)
			.ok_or_else(|| {
				BuildError::Config(format!("Missing configuration for storage '{}'", store_name))
			})?;
		let store_factory = factories.store_factories.get(store_name).ok_or_else(|| {
			BuildError::Config(format!("No factory registered for storage '{}'", store_name))
		})?;
		let store_backend = store_factory(store_config).map_err(|e| {
			tracing::error!(
				component = "storage",
				implementation = %store_name,
				error = %e,
				"Failed to create store backend"
			);
			BuildError::Config(format!(
				"Failed to create store backend '{}': {}",
				store_name, e
			))
		})?;
		store_backend
			.config_schema()
			.validate(store_config)
			.map_err(|e| {
				BuildError::Config(format!(
					"Invalid configuration for storage '{}': {}",
					store_name, e
				))
			})?;
		let store = Arc::new(OrderStore::new(store_backend));
		tracing::info!(component = "storage", implementation = %store_name, "Loaded");

		// Create the profile directory
		let directory_name = &config.directory.primary;
		let directory_config = config
			.directory
			.implementations
			.get(directory_name)
			.ok_or_else(|| {
				BuildError::Config(format!(
					"Missing configuration for directory '{}'",
					directory_name
				))
			})?;
		let directory_factory = factories
			.directory_factories
			.get(directory_name)
			.ok_or_else(|| {
				BuildError::Config(format!(
					"No factory registered for directory '{}'",
					directory_name
				))
			})?;
		let directory_impl = directory_factory(directory_config).map_err(|e| {
			tracing::error!(
				component = "directory",
				implementation = %directory_name,
				error = %e,
				"Failed to create directory"
			);
			BuildError::Config(format!(
				"Failed to create directory '{}': {}",
				directory_name, e
			))
		})?;
		directory_impl
			.config_schema()
			.validate(directory_config)
			.map_err(|e| {
				BuildError::Config(format!(
					"Invalid configuration for directory '{}': {}",
					directory_name, e
				))
			})?;
		let directory = Arc::new(DirectoryService::new(directory_impl));
		tracing::info!(component = "directory", implementation = %directory_name, "Loaded");

		// Create notification channels
		let mut channels: Vec<Box<dyn ChannelInterface>> = Vec::new();
		for (name, channel_config) in &config.notifications.channels {
			let Some(factory) = factories.channel_factories.get(name) else {
				tracing::error!(
					component = "notifications",
					implementation = %name,
					"No factory registered for channel, skipping"
				);
				continue;
			};
			match factory(channel_config) {
				Ok(channel) => match channel.config_schema().validate(channel_config) {
					Ok(_) => {
						tracing::info!(
							component = "notifications",
							implementation = %name,
							kind = %channel.kind(),
							"Loaded"
						);
						channels.push(channel);
					}
					Err(e) => {
						tracing::error!(
							component = "notifications",
							implementation = %name,
							error = %e,
							"Invalid configuration for channel, skipping"
						);
					}
				},
				Err(e) => {
					tracing::error!(
						component = "notifications",
						implementation = %name,
						error = %e,
						"Failed to create channel, skipping"
					);
				}
			}
		}
		if channels.is_empty() {
			tracing::warn!(
				"No notification channels available - buyers will not hear about order updates"
			);
		}

		let notifier = Arc::new(NotificationService::new(
			channels,
			directory,
			Duration::from_secs(config.notifications.send_timeout_seconds),
			RetryPolicy {
				max_attempts: config.notifications.retry_max_attempts,
				base_delay: Duration::from_millis(config.notifications.retry_base_delay_ms),
			},
		));

		// Create courier providers, one per covered delivery type
		let mut courier_providers: HashMap<DeliveryType, Box<dyn CourierInterface>> =
			HashMap::new();
		for (name, courier_config) in &config.couriers.implementations {
			let Some(factory) = factories.courier_factories.get(name) else {
				tracing::error!(
					component = "couriers",
					implementation = %name,
					"No factory registered for courier, skipping"
				);
				continue;
			};

			for delivery_type in declared_delivery_types(courier_config) {
				match factory(courier_config) {
					Ok(provider) => match provider.config_schema().validate(courier_config) {
						Ok(_) => {
							tracing::info!(
								component = "couriers",
								implementation = %name,
								delivery_type = %delivery_type,
								"Loaded"
							);
							courier_providers.insert(delivery_type, provider);
						}
						Err(e) => {
							tracing::error!(
								component = "couriers",
								implementation = %name,
								error = %e,
								"Invalid configuration for courier, skipping"
							);
						}
					},
					Err(e) => {
						tracing::error!(
							component = "couriers",
							implementation = %name,
							error = %e,
							"Failed to create courier, skipping"
						);
					}
				}
			}
		}
		for delivery_type in [DeliveryType::Standard, DeliveryType::Instant] {
			if !courier_providers.contains_key(&delivery_type) {
				tracing::warn!(
					delivery_type = %delivery_type,
					"No courier configured for this delivery type - bookings for it will fail"
				);
			}
		}

		let couriers = Arc::new(CourierService::new(
			courier_providers,
			Duration::from_secs(config.couriers.booking_timeout_seconds),
		));

		let event_bus = EventBus::new(config.service.event_capacity);

		Ok(OrderCoordinator::new(
			config.pricing.clone(),
			store,
			notifier,
			couriers,
			event_bus,
		))
	}
}

/// Reads the delivery types a courier implementation declares.
fn declared_delivery_types(config: &toml::Value) -> Vec<DeliveryType> {
	config
		.get("delivery_types")
		.and_then(|v| v.as_array())
		.map(|arr| {
			arr.iter()
				.filter_map(|v| match v.as_str() {
					Some("standard") => Some(DeliveryType::Standard),
					Some("instant") => Some(DeliveryType::Instant),
					_ => None,
				})
				.collect()
		})
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use giftflare_courier::{CourierError, CourierInterface};
	use giftflare_directory::implementations::fixture::FixtureDirectory;
	use giftflare_notify::ChannelError;
	use giftflare_storage::implementations::memory::MemoryStore;
	use giftflare_types::{
		Address, ChannelKind, ConfigSchema, GiftOptions, LineItem, OutboundMessage, Profile,
		ProfileRole, Schema, ValidationError,
	};
	use std::sync::Mutex;

	struct EmptySchema;

	impl ConfigSchema for EmptySchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	struct RecordingChannel {
		kind: ChannelKind,
		sent: Arc<Mutex<Vec<String>>>,
	}

	#[async_trait]
	impl giftflare_notify::ChannelInterface for RecordingChannel {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		fn kind(&self) -> ChannelKind {
			self.kind
		}

		async fn send(
			&self,
			_recipient: &str,
			message: &OutboundMessage,
		) -> Result<(), ChannelError> {
			self.sent.lock().unwrap().push(message.body.clone());
			Ok(())
		}
	}

	struct FailingChannel {
		kind: ChannelKind,
	}

	#[async_trait]
	impl giftflare_notify::ChannelInterface for FailingChannel {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		fn kind(&self) -> ChannelKind {
			self.kind
		}

		async fn send(
			&self,
			_recipient: &str,
			_message: &OutboundMessage,
		) -> Result<(), ChannelError> {
			Err(ChannelError::Provider("provider is down".into()))
		}
	}

	struct FixedCourier {
		tracking: String,
	}

	#[async_trait]
	impl CourierInterface for FixedCourier {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		async fn book(&self, _order: &Order) -> Result<String, CourierError> {
			Ok(self.tracking.clone())
		}
	}

	struct FailingCourier;

	#[async_trait]
	impl CourierInterface for FailingCourier {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		async fn book(&self, _order: &Order) -> Result<String, CourierError> {
			Err(CourierError::BookingFailed("no riders available".into()))
		}
	}

	fn buyer_profile() -> Profile {
		Profile {
			id: "buyer-1".into(),
			name: "Asha".into(),
			email: "asha@example.com".into(),
			role: ProfileRole::Buyer,
			city: "Bengaluru".into(),
		}
	}

	fn coordinator_with(
		channels: Vec<Box<dyn giftflare_notify::ChannelInterface>>,
		couriers: HashMap<DeliveryType, Box<dyn CourierInterface>>,
	) -> OrderCoordinator {
		let directory = Arc::new(DirectoryService::new(Box::new(FixtureDirectory::new(
			vec![buyer_profile()],
		))));
		let notifier = Arc::new(NotificationService::new(
			channels,
			directory,
			Duration::from_millis(200),
			RetryPolicy {
				max_attempts: 2,
				base_delay: Duration::from_millis(1),
			},
		));
		let store = Arc::new(OrderStore::new(Box::new(MemoryStore::new())));
		let couriers = Arc::new(CourierService::new(couriers, Duration::from_millis(500)));

		OrderCoordinator::new(
			PricingConfig::default(),
			store,
			notifier,
			couriers,
			EventBus::new(64),
		)
	}

	fn recording_coordinator() -> (OrderCoordinator, Arc<Mutex<Vec<String>>>) {
		let sent = Arc::new(Mutex::new(Vec::new()));
		let coordinator = coordinator_with(
			vec![Box::new(RecordingChannel {
				kind: ChannelKind::Email,
				sent: sent.clone(),
			})],
			HashMap::new(),
		);
		(coordinator, sent)
	}

	fn two_item_order() -> NewOrder {
		NewOrder {
			buyer_id: "buyer-1".into(),
			items: vec![
				LineItem {
					product_id: "p1".into(),
					seller_id: "s1".into(),
					name: "Scented candle".into(),
					quantity: 1,
					unit_price: 500,
					gift: GiftOptions::default(),
				},
				LineItem {
					product_id: "p2".into(),
					seller_id: "s1".into(),
					name: "Chocolate box".into(),
					quantity: 2,
					unit_price: 1_200,
					gift: GiftOptions::default(),
				},
			],
			delivery_type: DeliveryType::Standard,
			delivery_address: Address {
				name: "Asha".into(),
				line1: "12 MG Road".into(),
				line2: None,
				city: "Bengaluru".into(),
				pincode: "560001".into(),
				country: "IN".into(),
				phone: Some("+919876543210".into()),
			},
			friend_delivery: None,
			payment_reference: Some("pay_123".into()),
		}
	}

	#[tokio::test]
	async fn creation_computes_total_and_notifies_once() {
		let (coordinator, sent) = recording_coordinator();

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		assert_eq!(order.total_amount, 2_900);
		assert_eq!(order.status, OrderStatus::Pending);
		assert!(order.tracking_number.is_none());
		assert_eq!(sent.lock().unwrap().len(), 1);

		// The invariant holds on every subsequent read
		let fetched = coordinator.get_order(&order.id).await.unwrap();
		assert_eq!(fetched.total_amount, 2_900);
	}

	#[tokio::test]
	async fn creation_rejects_invalid_input_without_writing() {
		let (coordinator, sent) = recording_coordinator();

		let mut input = two_item_order();
		input.items.clear();
		let result = coordinator.create_order(input).await;
		assert!(matches!(result, Err(LifecycleError::Validation(_))));
		assert!(sent.lock().unwrap().is_empty());

		let orders = coordinator.list_orders_for_buyer("buyer-1").await.unwrap();
		assert!(orders.is_empty());
	}

	#[tokio::test]
	async fn transition_replay_is_a_noop_without_renotification() {
		let (coordinator, sent) = recording_coordinator();
		let order = coordinator.create_order(two_item_order()).await.unwrap();

		let confirmed = coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();
		assert_eq!(confirmed.status, OrderStatus::Confirmed);
		assert_eq!(sent.lock().unwrap().len(), 2); // placed + confirmed

		let replay = coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();
		assert_eq!(replay.status, OrderStatus::Confirmed);
		assert_eq!(sent.lock().unwrap().len(), 2); // unchanged
	}

	#[tokio::test]
	async fn shipping_requires_tracking_number() {
		let (coordinator, _) = recording_coordinator();
		let order = coordinator.create_order(two_item_order()).await.unwrap();
		coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();

		for bad_tracking in [None, Some("".to_string()), Some("   ".to_string())] {
			let result = coordinator
				.transition(&order.id, OrderStatus::Shipped, bad_tracking)
				.await;
			assert!(matches!(result, Err(LifecycleError::Validation(_))));
		}

		// Rejection left the order untouched
		let current = coordinator.get_order(&order.id).await.unwrap();
		assert_eq!(current.status, OrderStatus::Confirmed);
	}

	#[tokio::test]
	async fn skipping_a_state_is_illegal() {
		let (coordinator, _) = recording_coordinator();
		let order = coordinator.create_order(two_item_order()).await.unwrap();

		let result = coordinator
			.transition(&order.id, OrderStatus::Shipped, Some("T-1".into()))
			.await;
		assert!(matches!(
			result,
			Err(LifecycleError::IllegalTransition {
				from: OrderStatus::Pending,
				to: OrderStatus::Shipped
			})
		));
	}

	#[tokio::test]
	async fn unknown_order_is_not_found() {
		let (coordinator, _) = recording_coordinator();
		let result = coordinator.get_order("missing").await;
		assert!(matches!(result, Err(LifecycleError::NotFound(_))));

		let result = coordinator
			.transition("missing", OrderStatus::Confirmed, None)
			.await;
		assert!(matches!(result, Err(LifecycleError::NotFound(_))));
	}

	#[tokio::test]
	async fn failing_sms_never_fails_a_transition() {
		let email_sent = Arc::new(Mutex::new(Vec::new()));
		let coordinator = coordinator_with(
			vec![
				Box::new(RecordingChannel {
					kind: ChannelKind::Email,
					sent: email_sent.clone(),
				}),
				Box::new(FailingChannel {
					kind: ChannelKind::Sms,
				}),
			],
			HashMap::new(),
		);

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();
		let shipped = coordinator
			.transition(&order.id, OrderStatus::Shipped, Some("T-9".into()))
			.await
			.unwrap();

		assert_eq!(shipped.status, OrderStatus::Shipped);
		assert_eq!(shipped.tracking_number.as_deref(), Some("T-9"));
		// Email kept flowing the whole time: placed, confirmed, shipped
		assert_eq!(email_sent.lock().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn concurrent_confirmations_change_state_once() {
		let (coordinator, sent) = recording_coordinator();
		let order = coordinator.create_order(two_item_order()).await.unwrap();
		let placed_sends = sent.lock().unwrap().len();

		let (a, b) = tokio::join!(
			coordinator.transition(&order.id, OrderStatus::Confirmed, None),
			coordinator.transition(&order.id, OrderStatus::Confirmed, None),
		);
		assert!(a.is_ok());
		assert!(b.is_ok());

		let current = coordinator.get_order(&order.id).await.unwrap();
		assert_eq!(current.status, OrderStatus::Confirmed);
		// Exactly one caller performed the transition and notified
		assert_eq!(sent.lock().unwrap().len(), placed_sends + 1);
	}

	#[tokio::test]
	async fn racing_shipments_never_mix_tracking_numbers() {
		let (coordinator, sent) = recording_coordinator();
		let order = coordinator.create_order(two_item_order()).await.unwrap();
		coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();
		let sends_before = sent.lock().unwrap().len();

		let (a, b) = tokio::join!(
			coordinator.transition(&order.id, OrderStatus::Shipped, Some("T-A".into())),
			coordinator.transition(&order.id, OrderStatus::Shipped, Some("T-B".into())),
		);
		let a = a.unwrap();
		let b = b.unwrap();

		// Both callers observe the same winning row
		assert_eq!(a.tracking_number, b.tracking_number);
		let tracking = a.tracking_number.unwrap();
		assert!(tracking == "T-A" || tracking == "T-B");
		assert_eq!(sent.lock().unwrap().len(), sends_before + 1);
	}

	#[tokio::test]
	async fn booking_ships_a_confirmed_order() {
		let sent = Arc::new(Mutex::new(Vec::new()));
		let mut couriers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		couriers.insert(
			DeliveryType::Standard,
			Box::new(FixedCourier {
				tracking: "T-123".into(),
			}),
		);
		let coordinator = coordinator_with(
			vec![Box::new(RecordingChannel {
				kind: ChannelKind::Email,
				sent: sent.clone(),
			})],
			couriers,
		);

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();

		let shipped = coordinator.book_delivery(&order.id).await.unwrap();
		assert_eq!(shipped.status, OrderStatus::Shipped);
		assert_eq!(shipped.tracking_number.as_deref(), Some("T-123"));
	}

	#[tokio::test]
	async fn failed_booking_leaves_order_confirmed() {
		let mut couriers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		couriers.insert(DeliveryType::Standard, Box::new(FailingCourier));
		let coordinator = coordinator_with(vec![], couriers);
		let mut events = coordinator.event_bus().subscribe();

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();

		let result = coordinator.book_delivery(&order.id).await;
		assert!(matches!(result, Err(BookingError::Courier(_))));

		let current = coordinator.get_order(&order.id).await.unwrap();
		assert_eq!(current.status, OrderStatus::Confirmed);
		assert!(current.tracking_number.is_none());

		// The failure surfaced as a monitoring signal
		loop {
			match events.recv().await.unwrap() {
				LifecycleEvent::BookingFailed { order_id, reason } => {
					assert_eq!(order_id, order.id);
					assert!(reason.contains("no riders available"));
					break;
				}
				_ => continue,
			}
		}
	}

	#[tokio::test]
	async fn booking_requires_a_confirmed_order() {
		let mut couriers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		couriers.insert(
			DeliveryType::Standard,
			Box::new(FixedCourier {
				tracking: "T-1".into(),
			}),
		);
		let coordinator = coordinator_with(vec![], couriers);

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		let result = coordinator.book_delivery(&order.id).await;
		assert!(matches!(
			result,
			Err(BookingError::Lifecycle(LifecycleError::IllegalTransition {
				from: OrderStatus::Pending,
				to: OrderStatus::Shipped
			}))
		));
	}

	#[tokio::test]
	async fn full_lifecycle_scenario() {
		let mut couriers: HashMap<DeliveryType, Box<dyn CourierInterface>> = HashMap::new();
		couriers.insert(
			DeliveryType::Standard,
			Box::new(FixedCourier {
				tracking: "T-123".into(),
			}),
		);
		let sent = Arc::new(Mutex::new(Vec::new()));
		let coordinator = coordinator_with(
			vec![Box::new(RecordingChannel {
				kind: ChannelKind::Email,
				sent: sent.clone(),
			})],
			couriers,
		);

		let order = coordinator.create_order(two_item_order()).await.unwrap();
		assert_eq!(order.total_amount, 2_900);

		let confirmed = coordinator
			.transition(&order.id, OrderStatus::Confirmed, None)
			.await
			.unwrap();
		assert_eq!(confirmed.status, OrderStatus::Confirmed);

		let shipped = coordinator.book_delivery(&order.id).await.unwrap();
		assert_eq!(shipped.status, OrderStatus::Shipped);
		assert_eq!(shipped.tracking_number.as_deref(), Some("T-123"));

		let delivered = coordinator
			.transition(&order.id, OrderStatus::Delivered, None)
			.await
			.unwrap();
		assert_eq!(delivered.status, OrderStatus::Delivered);

		let result = coordinator
			.transition(&order.id, OrderStatus::Cancelled, None)
			.await;
		assert!(matches!(
			result,
			Err(LifecycleError::IllegalTransition {
				from: OrderStatus::Delivered,
				to: OrderStatus::Cancelled
			})
		));

		// placed, confirmed, shipped, delivered
		assert_eq!(sent.lock().unwrap().len(), 4);
	}
}
