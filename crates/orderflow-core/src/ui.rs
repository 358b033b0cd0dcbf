//! Presentation-facing helpers.
//!
//! Turns the transition table into render-ready data for a given order:
//! the raw list of reachable statuses for pickers, and labelled actions
//! for buttons. The current status is derived through the status manager,
//! so the options always reflect the audited timeline.

use crate::state::{rules, OrderStatusError, OrderStatusManager};
use orderflow_types::OrderStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One action a UI can offer from an order's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
	/// The status the action transitions to.
	pub status: OrderStatus,
	/// Human-facing button label.
	pub label: String,
}

/// Derives UI affordances from the transition table.
pub struct UIIntegrationService {
	manager: Arc<OrderStatusManager>,
}

impl UIIntegrationService {
	pub fn new(manager: Arc<OrderStatusManager>) -> Self {
		Self { manager }
	}

	/// Statuses reachable from the order's current status, in declaration
	/// order.
	///
	/// Empty for orders in a final status, which a UI renders as "no
	/// actions".
	pub async fn valid_next_states(
		&self,
		order_id: &str,
	) -> Result<Vec<OrderStatus>, OrderStatusError> {
		let current = self.manager.current_status(order_id).await?;
		Ok(rules::valid_transitions(current))
	}

	/// Labelled actions for every status reachable from the order's
	/// current status.
	pub async fn next_actions(&self, order_id: &str) -> Result<Vec<NextAction>, OrderStatusError> {
		Ok(self
			.valid_next_states(order_id)
			.await?
			.into_iter()
			.map(|status| NextAction {
				status,
				label: action_label(status).to_string(),
			})
			.collect())
	}
}

/// Imperative button label for transitioning into a status.
fn action_label(target: OrderStatus) -> &'static str {
	match target {
		OrderStatus::Pending => "Reopen",
		OrderStatus::Confirmed => "Confirm order",
		OrderStatus::Shipping => "Start shipping",
		OrderStatus::AwaitingConfirmation => "Mark as arrived",
		OrderStatus::Delivered => "Mark as delivered",
		OrderStatus::ConfirmedByCustomer => "Confirm receipt",
		OrderStatus::Cancelled => "Cancel order",
	}
}
