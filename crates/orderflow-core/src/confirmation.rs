//! Delivery-confirmation workflow.
//!
//! A narrow three-state machine (Pending -> Confirmed | Rejected) gating
//! order finalization. The pending record is created by the status manager
//! when an order enters `AwaitingConfirmation`; this workflow only resolves
//! it. Confirmation never mutates the order status directly: finalization
//! goes back through the status manager so the single audit trail is
//! preserved.

use crate::state::{OrderStatusError, OrderStatusManager};
use chrono::Utc;
use orderflow_notification::NotificationService;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{
	ConfirmationEvent, ConfirmationStatus, DeliveryConfirmation, LifecycleEvent, OrderStatus,
	StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while resolving a delivery confirmation.
#[derive(Debug, Error)]
pub enum ConfirmationError {
	#[error("No delivery confirmation exists for order {0}")]
	NotFound(String),
	#[error("Delivery confirmation already resolved as '{status:?}'")]
	AlreadyResolved { status: ConfirmationStatus },
	#[error("Actor '{actor}' is not authorized for order {order_id}")]
	Unauthorized { actor: String, order_id: String },
	#[error("Invalid rejection reason: {0}")]
	InvalidReason(String),
	#[error(transparent)]
	Order(#[from] OrderStatusError),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for ConfirmationError {
	fn from(e: StorageError) -> Self {
		ConfirmationError::Storage(e.to_string())
	}
}

/// Length bounds for a customer's rejection reason.
#[derive(Debug, Clone, Copy)]
pub struct ReasonPolicy {
	pub min_len: usize,
	pub max_len: usize,
}

impl Default for ReasonPolicy {
	fn default() -> Self {
		Self {
			min_len: 10,
			max_len: 500,
		}
	}
}

/// Resolves pending delivery confirmations.
pub struct DeliveryConfirmationWorkflow {
	storage: Arc<StorageService>,
	manager: Arc<OrderStatusManager>,
	notification: Arc<NotificationService>,
	policy: ReasonPolicy,
}

impl DeliveryConfirmationWorkflow {
	pub fn new(
		storage: Arc<StorageService>,
		manager: Arc<OrderStatusManager>,
		notification: Arc<NotificationService>,
		policy: ReasonPolicy,
	) -> Self {
		Self {
			storage,
			manager,
			notification,
			policy,
		}
	}

	/// Customer confirms the delivery.
	///
	/// Requires a pending confirmation owned by the caller. On success the
	/// confirmation is marked resolved and the order is finalized through
	/// the status manager: `AwaitingConfirmation -> Delivered ->
	/// ConfirmedByCustomer`, both hops audited on the timeline.
	pub async fn confirm(
		&self,
		order_id: &str,
		customer_id: &str,
	) -> Result<(), ConfirmationError> {
		{
			let _guard = self
				.storage
				.entity_lock(StorageKey::Confirmations.as_str(), order_id)
				.await;
			let mut confirmation = self.load_pending(order_id, customer_id).await?;
			confirmation.status = ConfirmationStatus::Confirmed;
			confirmation.confirmed_at = Some(Utc::now());
			self.storage
				.update(StorageKey::Confirmations.as_str(), order_id, &confirmation)
				.await?;
		}

		self.manager
			.update_status(
				order_id,
				OrderStatus::Delivered,
				customer_id,
				Some("delivery confirmed by customer".to_string()),
			)
			.await?;
		self.manager
			.confirm_delivery_by_customer(order_id, customer_id, None)
			.await?;

		tracing::info!(order_id, customer_id, "delivery confirmed");
		self.notification
			.send(LifecycleEvent::Confirmation(ConfirmationEvent::Resolved {
				order_id: order_id.to_string(),
				resolution: ConfirmationStatus::Confirmed,
				reason: None,
			}))
			.await;
		Ok(())
	}

	/// Customer disputes the delivery.
	///
	/// Records the rejection and its reason. Deliberately does not
	/// transition the order: a rejected delivery surfaces to staff for
	/// manual follow-up rather than taking a state-machine edge.
	pub async fn reject(
		&self,
		order_id: &str,
		customer_id: &str,
		reason: &str,
	) -> Result<(), ConfirmationError> {
		let reason = reason.trim();
		// Bounds are in characters, not bytes.
		let reason_chars = reason.chars().count();
		if reason_chars < self.policy.min_len || reason_chars > self.policy.max_len {
			return Err(ConfirmationError::InvalidReason(format!(
				"reason must be between {} and {} characters",
				self.policy.min_len, self.policy.max_len
			)));
		}

		{
			let _guard = self
				.storage
				.entity_lock(StorageKey::Confirmations.as_str(), order_id)
				.await;
			let mut confirmation = self.load_pending(order_id, customer_id).await?;
			confirmation.status = ConfirmationStatus::Rejected;
			confirmation.rejection_reason = Some(reason.to_string());
			confirmation.confirmed_at = Some(Utc::now());
			self.storage
				.update(StorageKey::Confirmations.as_str(), order_id, &confirmation)
				.await?;
		}

		tracing::warn!(order_id, customer_id, reason, "delivery rejected by customer");
		self.notification
			.send(LifecycleEvent::Confirmation(ConfirmationEvent::Resolved {
				order_id: order_id.to_string(),
				resolution: ConfirmationStatus::Rejected,
				reason: Some(reason.to_string()),
			}))
			.await;
		Ok(())
	}

	/// Returns the confirmation record for an order.
	pub async fn get(&self, order_id: &str) -> Result<DeliveryConfirmation, ConfirmationError> {
		match self
			.storage
			.retrieve::<DeliveryConfirmation>(StorageKey::Confirmations.as_str(), order_id)
			.await
		{
			Ok(confirmation) => Ok(confirmation),
			Err(StorageError::NotFound) => {
				Err(ConfirmationError::NotFound(order_id.to_string()))
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Loads the confirmation and checks ownership and pending state.
	/// Caller holds the confirmation entity lock.
	async fn load_pending(
		&self,
		order_id: &str,
		customer_id: &str,
	) -> Result<DeliveryConfirmation, ConfirmationError> {
		let confirmation = self.get(order_id).await?;
		let order = self.manager.load_order(order_id).await?;
		if order.customer_id != customer_id {
			return Err(ConfirmationError::Unauthorized {
				actor: customer_id.to_string(),
				order_id: order_id.to_string(),
			});
		}
		if confirmation.status.is_resolved() {
			return Err(ConfirmationError::AlreadyResolved {
				status: confirmation.status,
			});
		}
		Ok(confirmation)
	}
}
