//! Server-side order pricing and input validation.
//!
//! Totals are always derived here from the line-item snapshots so a
//! tampered client cannot dictate what it pays. All arithmetic is
//! checked; an overflowing cart is rejected as invalid input rather than
//! wrapping silently.

use crate::LifecycleError;
use giftflare_config::PricingConfig;
use giftflare_types::NewOrder;

/// Validates creation input before any write.
pub fn validate_new_order(input: &NewOrder) -> Result<(), LifecycleError> {
	if input.items.is_empty() {
		return Err(LifecycleError::Validation("order has no items".into()));
	}

	for item in &input.items {
		if item.quantity < 1 {
			return Err(LifecycleError::Validation(format!(
				"invalid quantity {} for product {}",
				item.quantity, item.product_id
			)));
		}
		if item.unit_price == 0 {
			return Err(LifecycleError::Validation(format!(
				"invalid unit price for product {}",
				item.product_id
			)));
		}
	}

	let wants_friend_delivery = input.items.iter().any(|i| i.gift.deliver_to_friend);
	match (&input.friend_delivery, wants_friend_delivery) {
		(None, true) => Err(LifecycleError::Validation(
			"friend delivery requested but no recipient details given".into(),
		)),
		(Some(_), false) => Err(LifecycleError::Validation(
			"recipient details given but no item requests friend delivery".into(),
		)),
		_ => Ok(()),
	}
}

/// Computes the order total in minor currency units.
///
/// Total = sum of (unit price x quantity) plus the packaging surcharge
/// for every gift-packaged line.
pub fn compute_total(input: &NewOrder, pricing: &PricingConfig) -> Result<u64, LifecycleError> {
	let mut total: u64 = 0;

	for item in &input.items {
		let line = item
			.unit_price
			.checked_mul(item.quantity as u64)
			.ok_or_else(|| LifecycleError::Validation("order total overflows".into()))?;
		total = total
			.checked_add(line)
			.ok_or_else(|| LifecycleError::Validation("order total overflows".into()))?;

		if item.gift.packaging {
			total = total
				.checked_add(pricing.gift_packaging_surcharge)
				.ok_or_else(|| LifecycleError::Validation("order total overflows".into()))?;
		}
	}

	Ok(total)
}
