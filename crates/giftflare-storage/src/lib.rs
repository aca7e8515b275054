//! Order store module for the Giftflare coordinator.
//!
//! This module provides abstractions for durable persistence of the order
//! aggregate, supporting different backend implementations such as
//! in-memory or file-based storage. The interface is deliberately
//! domain-typed: the conditional transition write happens inside the
//! backend's critical section, so a reader never observes a status change
//! without the tracking number that accompanied it.

use async_trait::async_trait;
use giftflare_types::{ConfigSchema, ImplementationRegistry, Order, OrderStatus};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during order store operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The requested order does not exist.
	#[error("Not found")]
	NotFound,
	/// An order with this id already exists.
	#[error("Order already exists: {0}")]
	AlreadyExists(String),
	/// The conditional write found a status other than the expected one.
	#[error("Status conflict: order is currently {current}")]
	Conflict { current: OrderStatus },
	/// Error during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// The field changes applied by one status transition.
///
/// A change only ever touches status, tracking number, and the update
/// timestamp; everything else on the aggregate is immutable after
/// creation.
#[derive(Debug, Clone)]
pub struct StatusChange {
	pub status: OrderStatus,
	/// Set on the ship transition, None otherwise.
	pub tracking_number: Option<String>,
	pub updated_at: u64,
}

/// Trait defining the low-level interface for order store backends.
#[async_trait]
pub trait OrderStoreInterface: Send + Sync {
	/// Persists a new order. Fails if the id is already taken.
	async fn insert(&self, order: &Order) -> Result<(), StoreError>;

	/// Retrieves an order by id.
	async fn get(&self, id: &str) -> Result<Order, StoreError>;

	/// Lists a buyer's orders, newest first.
	async fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError>;

	/// Applies a status change if and only if the order's current status
	/// equals `expected`, atomically within the backend. Returns the
	/// post-update row so callers never need a separate read.
	async fn apply_transition(
		&self,
		id: &str,
		expected: OrderStatus,
		change: StatusChange,
	) -> Result<Order, StoreError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for store factory functions.
pub type StoreFactory = fn(&toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError>;

/// Registry trait for store implementations.
pub trait StoreRegistry: ImplementationRegistry<Factory = StoreFactory> {}

/// Get all registered store implementations.
///
/// Returns a vector of (name, factory) tuples for all available store
/// implementations, used by the service binary to wire up configuration.
pub fn get_all_implementations() -> Vec<(&'static str, StoreFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level order store handle used by the coordinator.
///
/// Wraps the configured backend; the coordinator owns exactly one of
/// these and every order mutation flows through it.
pub struct OrderStore {
	backend: Box<dyn OrderStoreInterface>,
}

impl OrderStore {
	/// Creates a new OrderStore with the specified backend.
	pub fn new(backend: Box<dyn OrderStoreInterface>) -> Self {
		Self { backend }
	}

	/// Persists a new order.
	pub async fn insert(&self, order: &Order) -> Result<(), StoreError> {
		self.backend.insert(order).await
	}

	/// Retrieves an order by id.
	pub async fn get(&self, id: &str) -> Result<Order, StoreError> {
		self.backend.get(id).await
	}

	/// Lists a buyer's orders, newest first.
	pub async fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError> {
		self.backend.list_for_buyer(buyer_id).await
	}

	/// Applies a conditional status change, returning the updated order.
	pub async fn apply_transition(
		&self,
		id: &str,
		expected: OrderStatus,
		change: StatusChange,
	) -> Result<Order, StoreError> {
		self.backend.apply_transition(id, expected, change).await
	}
}

/// Sorts orders newest first, with id as a deterministic tie-break.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
	orders.sort_by(|a, b| {
		b.created_at
			.cmp(&a.created_at)
			.then_with(|| b.id.cmp(&a.id))
	});
}
