//! Core engine for the Giftflare order coordinator.
//!
//! This module provides the orchestration logic for the order lifecycle:
//! creation with server-side pricing, status transitions with state
//! machine enforcement and exactly-once notification dispatch, and
//! courier booking feeding tracking numbers back into the transition
//! engine. It includes the builder used to assemble a coordinator from
//! pluggable implementations.

use giftflare_courier::CourierError;
use giftflare_types::OrderStatus;
use thiserror::Error;

pub mod engine;
pub mod pricing;
pub mod state;

pub use engine::event_bus::EventBus;
pub use engine::{CoordinatorBuilder, CoordinatorFactories, OrderCoordinator};

/// Errors that fail a primary coordinator operation.
///
/// Notification and booking degradations are deliberately absent: they
/// are side-effect failures reported through logs and lifecycle events,
/// never converted into a failed primary response.
#[derive(Debug, Error)]
pub enum LifecycleError {
	/// Malformed input, rejected before any write.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// Referenced order does not exist.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// Requested status is not reachable from the current status.
	#[error("Illegal transition from {from} to {to}")]
	IllegalTransition { from: OrderStatus, to: OrderStatus },
	/// A concurrent transition won the race; the caller should re-read
	/// and retry if still applicable.
	#[error("Concurrent update conflict: order is currently {current}")]
	Conflict { current: OrderStatus },
	/// The store backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Errors returned by `book_delivery`.
///
/// Courier failures are separated from lifecycle errors so callers can
/// tell "the order cannot ship" (lifecycle) from "the courier declined
/// or timed out, try again" (courier).
#[derive(Debug, Error)]
pub enum BookingError {
	#[error(transparent)]
	Lifecycle(#[from] LifecycleError),
	#[error("Courier booking failed: {0}")]
	Courier(#[from] CourierError),
}

/// Errors that can occur while building a coordinator.
#[derive(Debug, Error)]
pub enum BuildError {
	#[error("Configuration error: {0}")]
	Config(String),
}
