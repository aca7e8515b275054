//! File-based order store backend.
//!
//! This module stores each order as a JSON document on the filesystem,
//! providing simple persistence without external dependencies. Writes go
//! through a temp-file-then-rename so a crashed write never leaves a
//! half-written order behind, and all mutations are serialized through a
//! store-wide async mutex so the conditional transition write remains a
//! single critical section.

use crate::{sort_newest_first, OrderStoreInterface, StatusChange, StoreError};
use async_trait::async_trait;
use giftflare_types::{ConfigSchema, Field, FieldType, Order, OrderStatus, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// File-based order store implementation.
pub struct FileStore {
	/// Base directory path for storing order documents.
	base_path: PathBuf,
	/// Serializes insert and conditional-transition writes.
	write_lock: Mutex<()>,
}

impl FileStore {
	/// Creates a new FileStore rooted at the given directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_lock: Mutex::new(()),
		}
	}

	/// Converts an order id to a filesystem-safe file path.
	fn order_path(&self, id: &str) -> PathBuf {
		let safe_id = id.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.json", safe_id))
	}

	async fn read_order(&self, id: &str) -> Result<Order, StoreError> {
		let path = self.order_path(id);
		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StoreError::NotFound)
			}
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		};

		serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
	}

	async fn write_order(&self, order: &Order) -> Result<(), StoreError> {
		let path = self.order_path(&order.id);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StoreError::Backend(e.to_string()))?;
		}

		let data =
			serde_json::to_vec_pretty(order).map_err(|e| StoreError::Serialization(e.to_string()))?;

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, data)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;

		Ok(())
	}
}

#[async_trait]
impl OrderStoreInterface for FileStore {
	async fn insert(&self, order: &Order) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		if self.order_path(&order.id).exists() {
			return Err(StoreError::AlreadyExists(order.id.clone()));
		}
		self.write_order(order).await
	}

	async fn get(&self, id: &str) -> Result<Order, StoreError> {
		self.read_order(id).await
	}

	async fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError> {
		let mut matches = Vec::new();

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// A store that has never written anything has no directory yet
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(matches),
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			match fs::read(&path).await {
				Ok(data) => match serde_json::from_slice::<Order>(&data) {
					Ok(order) if order.buyer_id == buyer_id => matches.push(order),
					Ok(_) => {}
					Err(e) => {
						tracing::warn!("Skipping unreadable order file {:?}: {}", path, e);
					}
				},
				Err(e) => {
					tracing::warn!("Skipping order file {:?}: {}", path, e);
				}
			}
		}

		sort_newest_first(&mut matches);
		Ok(matches)
	}

	async fn apply_transition(
		&self,
		id: &str,
		expected: OrderStatus,
		change: StatusChange,
	) -> Result<Order, StoreError> {
		let _guard = self.write_lock.lock().await;

		let mut order = self.read_order(id).await?;
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

		self.write_order(&order).await?;
		Ok(order)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStoreSchema)
	}
}

/// Configuration schema for FileStore.
pub struct FileStoreSchema;

impl ConfigSchema for FileStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry for the file store implementation.
pub struct Registry;

impl giftflare_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl crate::StoreRegistry for Registry {}

/// Factory function to create a file store from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for order documents (default: "./data/orders")
pub fn create_store(config: &toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/orders")
		.to_string();

	Ok(Box::new(FileStore::new(PathBuf::from(storage_path))))
}
