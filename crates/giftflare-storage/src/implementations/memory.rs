//! In-memory order store backend.
//!
//! This module provides a memory-based implementation of the
//! OrderStoreInterface trait, useful for testing and development
//! scenarios where persistence is not required.

use crate::{sort_newest_first, OrderStoreInterface, StatusChange, StoreError};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Order, OrderStatus, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory order store implementation.
///
/// Orders live in a HashMap behind a read-write lock; the conditional
/// transition write holds the write lock for its whole check-then-update,
/// which is the backend's critical section.
pub struct MemoryStore {
	orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl MemoryStore {
	/// Creates a new MemoryStore instance.
	pub fn new() -> Self {
		Self {
			orders: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStoreInterface for MemoryStore {
	async fn insert(&self, order: &Order) -> Result<(), StoreError> {
		let mut orders = self.orders.write().await;
		if orders.contains_key(&order.id) {
			return Err(StoreError::AlreadyExists(order.id.clone()));
		}
		orders.insert(order.id.clone(), order.clone());
		Ok(())
	}

	async fn get(&self, id: &str) -> Result<Order, StoreError> {
		let orders = self.orders.read().await;
		orders.get(id).cloned().ok_or(StoreError::NotFound)
	}

	async fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError> {
		let orders = self.orders.read().await;
		let mut matches: Vec<Order> = orders
			.values()
			.filter(|o| o.buyer_id == buyer_id)
			.cloned()
			.collect();
		sort_newest_first(&mut matches);
		Ok(matches)
	}

	async fn apply_transition(
		&self,
		id: &str,
		expected: OrderStatus,
		change: StatusChange,
	) -> Result<Order, StoreError> {
		let mut orders = self.orders.write().await;
		let order = orders.get_mut(id).ok_or(StoreError::NotFound)?;

		if order.status != expected {
			return Err(StoreError::Conflict {
				current: order.status,
			});
		}

		order.status = change.status;
		order.updated_at = change.updated_at;
		if let Some(tracking) = change.tracking_number {
			order.tracking_number = Some(tracking);
		}

		Ok(order.clone())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStoreSchema)
	}
}

/// Configuration schema for MemoryStore.
pub struct MemoryStoreSchema;

impl ConfigSchema for MemoryStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry for the memory store implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl crate::StoreRegistry for Registry {}

/// Factory function to create a memory store from configuration.
///
/// Configuration parameters: none required.
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError> {
	Ok(Box::new(MemoryStore::new()))
}
