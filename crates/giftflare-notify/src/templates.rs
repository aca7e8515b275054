//! Message templates for lifecycle notifications.
//!
//! Content varies by lifecycle step and delivery type: an instant-delivery
//! shipment announces the courier is on the way, while a standard shipment
//! carries its tracking number. SMS bodies stay short; email bodies carry
//! the fuller wording.

use giftflare_types::{DeliveryType, NotificationKind, Order, OutboundMessage};

/// Formats a minor-unit amount as rupees for message bodies.
fn format_amount(minor_units: u64) -> String {
	format!("Rs.{}.{:02}", minor_units / 100, minor_units % 100)
}

/// Short order reference used in subjects and SMS bodies.
fn order_ref(order: &Order) -> String {
	let short: String = order.id.chars().take(8).collect();
	format!("#{}", short.to_uppercase())
}

/// Renders the email variant for one lifecycle step.
pub fn email_message(order: &Order, kind: NotificationKind) -> OutboundMessage {
	let reference = order_ref(order);
	match kind {
		NotificationKind::Placed => OutboundMessage {
			subject: Some(format!("Your Giftflare order {} is placed", reference)),
			body: format!(
				"Thanks for your order! We received {} item(s) totalling {}. \
				 We'll let you know as soon as it's confirmed.",
				order.items.len(),
				format_amount(order.total_amount)
			),
		},
		NotificationKind::Confirmed => OutboundMessage {
			subject: Some(format!("Order {} confirmed", reference)),
			body: format!(
				"Your payment went through and order {} is confirmed. \
				 We're getting your gifts ready.",
				reference
			),
		},
		NotificationKind::Shipped => match order.delivery_type {
			DeliveryType::Instant => OutboundMessage {
				subject: Some(format!("Order {} is arriving soon", reference)),
				body: format!(
					"A courier has picked up order {} and is on the way. \
					 Expect the doorbell shortly!",
					reference
				),
			},
			DeliveryType::Standard => OutboundMessage {
				subject: Some(format!("Order {} has shipped", reference)),
				body: format!(
					"Order {} is on its way. Track it with number {}.",
					reference,
					order.tracking_number.as_deref().unwrap_or("(pending)")
				),
			},
		},
		NotificationKind::Delivered => OutboundMessage {
			subject: Some(format!("Order {} delivered", reference)),
			body: format!(
				"Order {} has been delivered. We hope it made someone's day!",
				reference
			),
		},
		NotificationKind::Cancelled => OutboundMessage {
			subject: Some(format!("Order {} cancelled", reference)),
			body: format!(
				"Order {} has been cancelled. If you were charged, the amount \
				 will be refunded to your original payment method.",
				reference
			),
		},
	}
}

/// Renders the SMS variant for one lifecycle step.
pub fn sms_message(order: &Order, kind: NotificationKind) -> OutboundMessage {
	let reference = order_ref(order);
	let body = match kind {
		NotificationKind::Placed => format!(
			"Giftflare: order {} placed for {}. We'll text you updates.",
			reference,
			format_amount(order.total_amount)
		),
		NotificationKind::Confirmed => {
			format!("Giftflare: order {} confirmed.", reference)
		}
		NotificationKind::Shipped => match order.delivery_type {
			DeliveryType::Instant => format!(
				"Giftflare: order {} is out with a courier and arriving soon.",
				reference
			),
			DeliveryType::Standard => format!(
				"Giftflare: order {} shipped. Tracking: {}.",
				reference,
				order.tracking_number.as_deref().unwrap_or("(pending)")
			),
		},
		NotificationKind::Delivered => {
			format!("Giftflare: order {} delivered. Enjoy!", reference)
		}
		NotificationKind::Cancelled => {
			format!("Giftflare: order {} cancelled.", reference)
		}
	};

	OutboundMessage {
		subject: None,
		body,
	}
}
