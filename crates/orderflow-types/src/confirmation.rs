//! Delivery-confirmation types gating order finalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a delivery confirmation.
///
/// `Confirmed` and `Rejected` are terminal; only one resolution ever wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
	/// Awaiting the customer's response.
	Pending,
	/// Customer confirmed receipt.
	Confirmed,
	/// Customer disputed the delivery.
	Rejected,
}

impl ConfirmationStatus {
	/// Returns true once the confirmation has been resolved either way.
	pub fn is_resolved(&self) -> bool {
		!matches!(self, ConfirmationStatus::Pending)
	}
}

/// A delivery confirmation tied 1:1 to an order.
///
/// Created exactly when the order first enters `AwaitingConfirmation`;
/// its existence is an invariant maintained by the status manager, not a
/// separate entry point callers must remember to invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfirmation {
	/// Unique identifier for this confirmation.
	pub id: String,
	/// The order this confirmation gates.
	pub order_id: String,
	/// Current resolution state.
	pub status: ConfirmationStatus,
	/// Customer-supplied reason, set when the delivery is rejected.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rejection_reason: Option<String>,
	/// When the confirmation was resolved, if it has been.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub confirmed_at: Option<DateTime<Utc>>,
	/// When the order entered `AwaitingConfirmation`.
	pub created_at: DateTime<Utc>,
}

impl DeliveryConfirmation {
	/// Creates a pending confirmation for an order.
	pub fn pending(order_id: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			order_id: order_id.into(),
			status: ConfirmationStatus::Pending,
			rejection_reason: None,
			confirmed_at: None,
			created_at: Utc::now(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pending_is_unresolved() {
		let confirmation = DeliveryConfirmation::pending("o1");
		assert_eq!(confirmation.status, ConfirmationStatus::Pending);
		assert!(!confirmation.status.is_resolved());
		assert!(confirmation.confirmed_at.is_none());
	}

	#[test]
	fn resolved_states() {
		assert!(ConfirmationStatus::Confirmed.is_resolved());
		assert!(ConfirmationStatus::Rejected.is_resolved());
	}
}
