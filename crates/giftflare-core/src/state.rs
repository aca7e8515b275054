//! Order status state machine.
//!
//! Encodes the legal transition graph: orders move forward through
//! Pending -> Confirmed -> Shipped -> Delivered, and Cancelled is
//! reachable from every non-terminal status. Delivered and Cancelled are
//! terminal. The engine consults this table before every conditional
//! write; a target outside the table is rejected, never coerced to a
//! nearby legal state.

use giftflare_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

// Static transition table - each status maps to allowed next statuses
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Confirmed, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Confirmed,
		HashSet::from([OrderStatus::Shipped, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Shipped,
		HashSet::from([OrderStatus::Delivered, OrderStatus::Cancelled]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Checks whether a transition is legal.
///
/// A same-status "transition" is not an edge of the graph; the engine
/// treats it as an idempotent no-op before consulting this table.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

/// Whether a status has no outgoing edges.
pub fn is_terminal(status: OrderStatus) -> bool {
	TRANSITIONS.get(&status).is_none_or(|set| set.is_empty())
}
