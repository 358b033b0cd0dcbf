//! Notification event types emitted on accepted transitions.
//!
//! Events flow to the notification collaborator after a transition has been
//! validated and persisted. Delivery is best-effort: a failed notification
//! is logged and never rolls back the committed transition.

use crate::{ConfirmationStatus, OrderStatus, ReturnStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main event type covering all lifecycle notifications.
///
/// Events are categorized by the workflow that produces them, allowing
/// sinks to filter and render specific kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
	/// Events from the order status manager.
	Order(OrderEvent),
	/// Events from the delivery-confirmation workflow.
	Confirmation(ConfirmationEvent),
	/// Events from the return/refund workflow.
	Return(ReturnEvent),
	/// Events from the synchronization service.
	Sync(SyncEvent),
}

/// Events related to order status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// An order moved to a new status.
	StatusChanged {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
		updated_by: String,
	},
}

/// Events related to delivery confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConfirmationEvent {
	/// A pending confirmation was resolved by the customer.
	Resolved {
		order_id: String,
		resolution: ConfirmationStatus,
		reason: Option<String>,
	},
}

/// Events related to the return/refund workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReturnEvent {
	/// A customer opened a return request.
	Requested {
		request_id: String,
		order_id: String,
		return_code: String,
	},
	/// The request moved to a new status.
	StatusChanged {
		request_id: String,
		order_id: String,
		from: ReturnStatus,
		to: ReturnStatus,
	},
	/// A refund was credited to the customer's wallet.
	RefundCompleted {
		request_id: String,
		order_id: String,
		customer_id: String,
		amount: Decimal,
	},
}

/// Events related to data synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncEvent {
	/// An order's stored status was force-repaired from its timeline.
	StatusRepaired {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
}
