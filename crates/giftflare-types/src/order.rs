//! Order aggregate types for the coordinator.
//!
//! This module defines the order aggregate: line items with their gift
//! options, delivery addresses, the status enum driving the transition
//! engine, and the input type accepted at order creation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single line of an order.
///
/// Prices are snapshots taken at order time, in minor currency units
/// (paise); the catalog is never re-consulted after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
	/// Catalog product this line refers to.
	pub product_id: String,
	/// Seller fulfilling this line.
	pub seller_id: String,
	/// Product name snapshot, used in notification templates.
	pub name: String,
	/// Number of units, at least 1.
	pub quantity: u32,
	/// Unit price snapshot in minor currency units.
	pub unit_price: u64,
	/// Gifting options selected for this line.
	#[serde(default)]
	pub gift: GiftOptions,
}

/// Gifting options carried per line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftOptions {
	/// Whether the line is gift-packaged (adds the packaging surcharge).
	#[serde(default)]
	pub packaging: bool,
	/// Personal note printed on the gift card.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
	/// Whether this line should be delivered to a different recipient.
	#[serde(default)]
	pub deliver_to_friend: bool,
}

/// A structured postal address with contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
	/// Contact person at this address.
	pub name: String,
	/// First address line.
	pub line1: String,
	/// Optional second address line.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line2: Option<String>,
	pub city: String,
	pub pincode: String,
	pub country: String,
	/// Contact phone; when absent the SMS channel is skipped for the order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
}

/// Alternate-recipient details, present when any line item requests
/// delivery to a friend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendDelivery {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	pub address: Address,
}

/// Delivery classes offered by the storefront.
///
/// Instant delivery is only available for seller/city pairs flagged for
/// expedited courier fulfillment; that eligibility check happens upstream
/// and the chosen type is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
	Standard,
	Instant,
}

impl fmt::Display for DeliveryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DeliveryType::Standard => write!(f, "standard"),
			DeliveryType::Instant => write!(f, "instant"),
		}
	}
}

/// Status of an order in the coordinator.
///
/// Orders move forward through Pending -> Confirmed -> Shipped ->
/// Delivered; Cancelled is reachable from any non-terminal status. The
/// transition engine is the only writer of this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Order has been created but payment is not yet confirmed.
	Pending,
	/// Payment captured; order awaits courier booking.
	Confirmed,
	/// Courier booked, tracking number assigned.
	Shipped,
	/// Order reached the recipient (terminal).
	Delivered,
	/// Order was cancelled before delivery (terminal).
	Cancelled,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Confirmed => write!(f, "confirmed"),
			OrderStatus::Shipped => write!(f, "shipped"),
			OrderStatus::Delivered => write!(f, "delivered"),
			OrderStatus::Cancelled => write!(f, "cancelled"),
		}
	}
}

/// The order aggregate: the single consistency boundary for one checkout.
///
/// `total_amount` is computed server-side at creation and never
/// recomputed. `tracking_number` is set at most once, on the
/// Confirmed -> Shipped edge. `updated_at` changes only on status
/// transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier, assigned at creation.
	pub id: String,
	/// Purchasing account.
	pub buyer_id: String,
	/// Line items, in cart order.
	pub items: Vec<LineItem>,
	/// Total in minor currency units: sum of line totals plus packaging
	/// surcharges.
	pub total_amount: u64,
	/// Delivery class, fixed at creation.
	pub delivery_type: DeliveryType,
	/// Where the order ships to.
	pub delivery_address: Address,
	/// Alternate recipient, when any line requests friend delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub friend_delivery: Option<FriendDelivery>,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Courier tracking number, set on the ship transition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tracking_number: Option<String>,
	/// Opaque payment-capture reference from the upstream payment step.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_reference: Option<String>,
	/// Creation timestamp (Unix seconds).
	pub created_at: u64,
	/// Last transition timestamp (Unix seconds).
	pub updated_at: u64,
}

/// Input accepted by order creation.
///
/// Deliberately has no total field: the total is always derived from the
/// item snapshots on the server to prevent price tampering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
	pub buyer_id: String,
	pub items: Vec<LineItem>,
	pub delivery_type: DeliveryType,
	pub delivery_address: Address,
	#[serde(default)]
	pub friend_delivery: Option<FriendDelivery>,
	#[serde(default)]
	pub payment_reference: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_serializes_lowercase() {
		let s = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
		assert_eq!(s, "\"confirmed\"");
		let back: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
		assert_eq!(back, OrderStatus::Shipped);
	}

	#[test]
	fn new_order_accepts_camel_case_payload() {
		let payload = r#"{
			"buyerId": "buyer-1",
			"items": [{
				"productId": "p1",
				"sellerId": "s1",
				"name": "Scented candle",
				"quantity": 2,
				"unitPrice": 500
			}],
			"deliveryType": "instant",
			"deliveryAddress": {
				"name": "Asha",
				"line1": "12 MG Road",
				"city": "Bengaluru",
				"pincode": "560001",
				"country": "IN"
			}
		}"#;

		let order: NewOrder = serde_json::from_str(payload).unwrap();
		assert_eq!(order.delivery_type, DeliveryType::Instant);
		assert_eq!(order.items.len(), 1);
		assert!(!order.items[0].gift.packaging);
		assert!(order.delivery_address.phone.is_none());
	}
}
