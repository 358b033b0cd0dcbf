//! Order entity and order-status types.
//!
//! This module defines the order-status enum driving the lifecycle state
//! machine, together with the order entity the core reads and mutates.
//! The core never constructs or deletes an order; creation belongs to the
//! commerce front end, which stores orders through the storage service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a commerce order.
///
/// `ConfirmedByCustomer` and `Cancelled` are final states with no outgoing
/// transitions. The permitted edges between statuses live in the transition
/// rule table in `orderflow-core`; this type only carries identity, display
/// labels and the final-state predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order placed, awaiting staff confirmation.
	Pending,
	/// Order confirmed by staff, awaiting handover to the carrier.
	Confirmed,
	/// Order in transit with the carrier.
	Shipping,
	/// Carrier reports arrival; customer confirmation pending.
	AwaitingConfirmation,
	/// Delivery acknowledged; the return window runs from here.
	Delivered,
	/// Customer confirmed receipt; order finalized.
	ConfirmedByCustomer,
	/// Order cancelled; terminal.
	Cancelled,
}

impl OrderStatus {
	/// Returns true for statuses with no outgoing transitions.
	pub fn is_final(&self) -> bool {
		matches!(self, OrderStatus::ConfirmedByCustomer | OrderStatus::Cancelled)
	}

	/// Returns true when the order has reached a delivered-equivalent status.
	///
	/// Both `Delivered` and `ConfirmedByCustomer` count: a customer who
	/// already confirmed receipt may still open a return while the window
	/// is running.
	pub fn is_delivered_marker(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::ConfirmedByCustomer)
	}

	/// Human-facing display label for this status.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending confirmation",
			OrderStatus::Confirmed => "Confirmed",
			OrderStatus::Shipping => "Shipping",
			OrderStatus::AwaitingConfirmation => "Awaiting delivery confirmation",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::ConfirmedByCustomer => "Completed",
			OrderStatus::Cancelled => "Cancelled",
		}
	}

	/// Returns an iterator over all status variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Confirmed,
			Self::Shipping,
			Self::AwaitingConfirmation,
			Self::Delivered,
			Self::ConfirmedByCustomer,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Externally visible marker layered over the order status while a return
/// cycle is running.
///
/// The status enum has no "return in progress" variant; the return workflow
/// instead maintains this marker through the status manager so the audit
/// trail stays in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMarker {
	/// A return has been requested and awaits a staff decision.
	Requested,
	/// A return has been approved and goods are on their way back.
	InProgress,
}

/// A commerce order as seen by the lifecycle core.
///
/// Identity, ownership and amounts are set at creation by the commerce
/// front end; the core only reads them and mutates `status`,
/// `return_marker`, `delivered_at` and `updated_at` under the transition
/// rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Identifier of the owning customer.
	pub customer_id: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Return-cycle marker, present while a return request is open.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub return_marker: Option<ReturnMarker>,
	/// Total order amount; also the refundable amount on a completed return.
	pub total_amount: Decimal,
	/// Timestamp when the order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when the order was delivered, once known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<DateTime<Utc>>,
	/// Timestamp of the last mutation.
	pub updated_at: DateTime<Utc>,
}

/// Result of an accepted status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
	/// Order the change applies to.
	pub order_id: String,
	/// Status before the transition.
	pub previous_status: OrderStatus,
	/// Status after the transition.
	pub new_status: OrderStatus,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn final_states() {
		assert!(OrderStatus::ConfirmedByCustomer.is_final());
		assert!(OrderStatus::Cancelled.is_final());
		for status in OrderStatus::all().filter(|s| !s.is_final()) {
			assert!(
				!status.is_final(),
				"{status:?} must not be final"
			);
		}
	}

	#[test]
	fn delivered_marker_covers_confirmed_receipt() {
		assert!(OrderStatus::Delivered.is_delivered_marker());
		assert!(OrderStatus::ConfirmedByCustomer.is_delivered_marker());
		assert!(!OrderStatus::Shipping.is_delivered_marker());
	}

	#[test]
	fn status_serde_uses_snake_case() {
		let json = serde_json::to_string(&OrderStatus::AwaitingConfirmation).unwrap();
		assert_eq!(json, "\"awaiting_confirmation\"");
	}
}
