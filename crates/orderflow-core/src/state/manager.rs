//! Order status manager.
//!
//! Orchestrates a single order's status change: validates the proposed
//! transition against the rule table, persists the new status, appends the
//! audit timeline entry and fires the best-effort side-effect hooks. Every
//! state-changing operation holds the order's entity lock across its whole
//! read-validate-write sequence, so two racing transitions on one order
//! serialize and at most one of a mutually exclusive pair succeeds.

use crate::state::rules;
use chrono::Utc;
use orderflow_notification::NotificationService;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{
	latest_entry, DeliveryConfirmation, LifecycleEvent, Order, OrderEvent, OrderStatus,
	ReturnMarker, StatusUpdate, StorageKey, TimelineEntry,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while changing an order's status.
///
/// Validation failures are expected business outcomes; each variant carries
/// enough context for a caller to render an actionable message.
#[derive(Debug, Error)]
pub enum OrderStatusError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Invalid transition from '{current}' to '{attempted}'; valid transitions: {}", rules::describe_alternatives(alternatives))]
	InvalidTransition {
		current: OrderStatus,
		attempted: OrderStatus,
		alternatives: Vec<OrderStatus>,
	},
	#[error("Order is in final state '{status}' and can no longer change")]
	FinalStateModification { status: OrderStatus },
	#[error("Order must be in status '{expected}' but is '{actual}'")]
	InvalidOrderStatus {
		actual: OrderStatus,
		expected: OrderStatus,
	},
	#[error("Actor '{actor}' is not authorized for order {order_id}")]
	Unauthorized { actor: String, order_id: String },
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for OrderStatusError {
	fn from(e: StorageError) -> Self {
		OrderStatusError::Storage(e.to_string())
	}
}

/// Manages order status transitions, the audit timeline and side-effect
/// hooks.
pub struct OrderStatusManager {
	storage: Arc<StorageService>,
	notification: Arc<NotificationService>,
}

impl OrderStatusManager {
	pub fn new(storage: Arc<StorageService>, notification: Arc<NotificationService>) -> Self {
		Self {
			storage,
			notification,
		}
	}

	/// Applies a validated status change to an order.
	///
	/// Algorithm: load the order, derive its current status from the
	/// latest timeline entry, validate the proposed edge, then persist the
	/// new status and append the timeline entry. Side effects
	/// (notification, confirmation-record creation) run after the write
	/// and never roll it back.
	pub async fn update_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		actor_id: &str,
		notes: Option<String>,
	) -> Result<StatusUpdate, OrderStatusError> {
		let _guard = self
			.storage
			.entity_lock(StorageKey::Orders.as_str(), order_id)
			.await;
		self.apply_transition(order_id, new_status, actor_id, notes)
			.await
	}

	/// The customer-facing finalization transition.
	///
	/// Additionally verifies that the caller owns the order and that the
	/// current status is exactly `Delivered`; the ownership and status
	/// failures carry distinct variants so callers can render the right
	/// message.
	pub async fn confirm_delivery_by_customer(
		&self,
		order_id: &str,
		customer_id: &str,
		notes: Option<String>,
	) -> Result<StatusUpdate, OrderStatusError> {
		let _guard = self
			.storage
			.entity_lock(StorageKey::Orders.as_str(), order_id)
			.await;

		let order = self.load_order(order_id).await?;
		if order.customer_id != customer_id {
			return Err(OrderStatusError::Unauthorized {
				actor: customer_id.to_string(),
				order_id: order_id.to_string(),
			});
		}
		let current = self.derive_status(&order).await?;
		if current != OrderStatus::Delivered {
			return Err(OrderStatusError::InvalidOrderStatus {
				actual: current,
				expected: OrderStatus::Delivered,
			});
		}

		self.apply_transition(order_id, OrderStatus::ConfirmedByCustomer, customer_id, notes)
			.await
	}

	/// Returns the order's current status, derived from the timeline.
	pub async fn current_status(&self, order_id: &str) -> Result<OrderStatus, OrderStatusError> {
		let order = self.load_order(order_id).await?;
		self.derive_status(&order).await
	}

	/// Returns the order's full audit trail, oldest first.
	pub async fn timeline(&self, order_id: &str) -> Result<Vec<TimelineEntry>, OrderStatusError> {
		// Loading the order first turns a bare id typo into OrderNotFound
		// rather than an empty history.
		self.load_order(order_id).await?;
		let mut entries = self.load_timeline(order_id).await?;
		entries.sort_by_key(|e| e.timestamp);
		Ok(entries)
	}

	/// Sets or clears the externally visible return marker.
	///
	/// The return workflow communicates its status reverts through here
	/// rather than writing the order field directly, keeping the audit
	/// trail in one place: the change is recorded as a timeline note at
	/// the unchanged status.
	pub async fn set_return_marker(
		&self,
		order_id: &str,
		marker: Option<ReturnMarker>,
		actor_id: &str,
		note: &str,
	) -> Result<(), OrderStatusError> {
		let _guard = self
			.storage
			.entity_lock(StorageKey::Orders.as_str(), order_id)
			.await;

		let mut order = self.load_order(order_id).await?;
		let current = self.derive_status(&order).await?;
		order.return_marker = marker;
		order.updated_at = Utc::now();
		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;
		self.append_entry(TimelineEntry::now(
			order_id,
			current,
			actor_id,
			Some(note.to_string()),
		))
		.await?;
		tracing::info!(order_id, ?marker, "return marker updated");
		Ok(())
	}

	/// Clears the return marker, restoring the plain delivered view.
	pub async fn clear_return_marker(
		&self,
		order_id: &str,
		actor_id: &str,
		note: &str,
	) -> Result<(), OrderStatusError> {
		self.set_return_marker(order_id, None, actor_id, note).await
	}

	/// Loads an order, mapping a missing key to `OrderNotFound`.
	pub(crate) async fn load_order(&self, order_id: &str) -> Result<Order, OrderStatusError> {
		match self
			.storage
			.retrieve::<Order>(StorageKey::Orders.as_str(), order_id)
			.await
		{
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => {
				Err(OrderStatusError::OrderNotFound(order_id.to_string()))
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Derives the current status from the latest timeline entry.
	///
	/// An empty timeline means no transition has been audited yet; the
	/// stored field stands in that case.
	pub(crate) async fn derive_status(&self, order: &Order) -> Result<OrderStatus, OrderStatusError> {
		let entries = self.load_timeline(&order.id).await?;
		Ok(latest_entry(&entries)
			.map(|e| e.status)
			.unwrap_or(order.status))
	}

	async fn load_timeline(&self, order_id: &str) -> Result<Vec<TimelineEntry>, OrderStatusError> {
		match self
			.storage
			.retrieve::<Vec<TimelineEntry>>(StorageKey::Timelines.as_str(), order_id)
			.await
		{
			Ok(entries) => Ok(entries),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(e.into()),
		}
	}

	async fn append_entry(&self, entry: TimelineEntry) -> Result<(), OrderStatusError> {
		let mut entries = self.load_timeline(&entry.order_id).await?;
		let order_id = entry.order_id.clone();
		entries.push(entry);
		self.storage
			.store(StorageKey::Timelines.as_str(), &order_id, &entries)
			.await?;
		Ok(())
	}

	/// Validates and persists one transition. Caller holds the order lock.
	async fn apply_transition(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		actor_id: &str,
		notes: Option<String>,
	) -> Result<StatusUpdate, OrderStatusError> {
		let mut order = self.load_order(order_id).await?;
		let current = self.derive_status(&order).await?;

		// Final-state protection is a stronger guarantee than a wrong edge
		// in the graph and is reported distinctly.
		if current.is_final() {
			return Err(OrderStatusError::FinalStateModification { status: current });
		}
		let check = rules::validate(current, new_status);
		if !check.ok {
			return Err(OrderStatusError::InvalidTransition {
				current,
				attempted: new_status,
				alternatives: check.alternatives,
			});
		}

		let now = Utc::now();
		order.status = new_status;
		order.updated_at = now;
		if new_status == OrderStatus::Delivered && order.delivered_at.is_none() {
			order.delivered_at = Some(now);
		}
		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;
		self.append_entry(TimelineEntry::now(order_id, new_status, actor_id, notes))
			.await?;

		tracing::info!(
			order_id,
			from = %current,
			to = %new_status,
			updated_by = actor_id,
			"order status updated"
		);

		// Entering AwaitingConfirmation creates the pending confirmation
		// record; the invariant lives here, not with the caller.
		if new_status == OrderStatus::AwaitingConfirmation {
			self.ensure_confirmation(order_id).await?;
		}

		self.notification
			.send(LifecycleEvent::Order(OrderEvent::StatusChanged {
				order_id: order_id.to_string(),
				from: current,
				to: new_status,
				updated_by: actor_id.to_string(),
			}))
			.await;

		Ok(StatusUpdate {
			order_id: order_id.to_string(),
			previous_status: current,
			new_status,
		})
	}

	/// Creates the pending delivery confirmation exactly once per order.
	async fn ensure_confirmation(&self, order_id: &str) -> Result<(), OrderStatusError> {
		if self
			.storage
			.exists(StorageKey::Confirmations.as_str(), order_id)
			.await?
		{
			return Ok(());
		}
		let confirmation = DeliveryConfirmation::pending(order_id);
		self.storage
			.store(StorageKey::Confirmations.as_str(), order_id, &confirmation)
			.await?;
		tracing::info!(order_id, "delivery confirmation created");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{seed_order, test_manager};
	use orderflow_types::OrderStatus::*;

	#[tokio::test]
	async fn round_trip_update_and_derive() {
		let (manager, storage, notifier) = test_manager();
		seed_order(&storage, "o1", "c1", Pending).await;

		let update = manager
			.update_status("o1", Confirmed, "staff1", None)
			.await
			.unwrap();
		assert_eq!(update.previous_status, Pending);
		assert_eq!(update.new_status, Confirmed);

		assert_eq!(manager.current_status("o1").await.unwrap(), Confirmed);
		let timeline = manager.timeline("o1").await.unwrap();
		assert_eq!(timeline.last().unwrap().status, Confirmed);
		assert_eq!(notifier.events().len(), 1);
	}

	#[tokio::test]
	async fn idempotent_reads() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", Shipping).await;

		let first = manager.current_status("o1").await.unwrap();
		let second = manager.current_status("o1").await.unwrap();
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn invalid_transition_lists_alternatives() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", Pending).await;

		let err = manager
			.update_status("o1", Shipping, "staff1", None)
			.await
			.unwrap_err();
		match err {
			OrderStatusError::InvalidTransition {
				current,
				attempted,
				alternatives,
			} => {
				assert_eq!(current, Pending);
				assert_eq!(attempted, Shipping);
				assert_eq!(alternatives, vec![Confirmed, Cancelled]);
			},
			other => panic!("expected InvalidTransition, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn final_state_blocks_further_changes() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", Delivered).await;

		let update = manager
			.confirm_delivery_by_customer("o1", "c1", None)
			.await
			.unwrap();
		assert_eq!(update.new_status, ConfirmedByCustomer);

		let err = manager
			.update_status("o1", Cancelled, "staff1", None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			OrderStatusError::FinalStateModification {
				status: ConfirmedByCustomer
			}
		));
	}

	#[tokio::test]
	async fn confirm_delivery_requires_owner_and_delivered() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", Shipping).await;

		let err = manager
			.confirm_delivery_by_customer("o1", "someone-else", None)
			.await
			.unwrap_err();
		assert!(matches!(err, OrderStatusError::Unauthorized { .. }));

		let err = manager
			.confirm_delivery_by_customer("o1", "c1", None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			OrderStatusError::InvalidOrderStatus {
				actual: Shipping,
				expected: Delivered,
			}
		));
	}

	#[tokio::test]
	async fn missing_order_reported_without_state_change() {
		let (manager, _, notifier) = test_manager();
		let err = manager
			.update_status("ghost", Confirmed, "staff1", None)
			.await
			.unwrap_err();
		assert!(matches!(err, OrderStatusError::OrderNotFound(_)));
		assert!(notifier.events().is_empty());
	}

	#[tokio::test]
	async fn awaiting_confirmation_creates_confirmation_record() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", Shipping).await;

		manager
			.update_status("o1", AwaitingConfirmation, "carrier", None)
			.await
			.unwrap();
		let confirmation: DeliveryConfirmation = storage
			.retrieve(StorageKey::Confirmations.as_str(), "o1")
			.await
			.unwrap();
		assert_eq!(
			confirmation.status,
			orderflow_types::ConfirmationStatus::Pending
		);
	}

	#[tokio::test]
	async fn racing_exclusive_transitions_admit_exactly_one_winner() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", AwaitingConfirmation).await;
		let manager = Arc::new(manager);

		let deliver = {
			let manager = manager.clone();
			tokio::spawn(async move {
				manager
					.update_status("o1", Delivered, "carrier", None)
					.await
			})
		};
		let cancel = {
			let manager = manager.clone();
			tokio::spawn(async move {
				manager
					.update_status("o1", Cancelled, "staff2", None)
					.await
			})
		};

		let results = [deliver.await.unwrap(), cancel.await.unwrap()];
		let winners = results.iter().filter(|r| r.is_ok()).count();
		assert_eq!(winners, 1, "exactly one of the racing transitions wins");

		// The loser observed the already-changed status: either edge from
		// the winner's status is no longer permitted.
		let loser = results.iter().find(|r| r.is_err()).unwrap();
		assert!(matches!(
			loser,
			Err(OrderStatusError::InvalidTransition { .. })
				| Err(OrderStatusError::FinalStateModification { .. })
		));
	}

	#[tokio::test]
	async fn delivered_timestamp_recorded_once() {
		let (manager, storage, _) = test_manager();
		seed_order(&storage, "o1", "c1", AwaitingConfirmation).await;

		manager
			.update_status("o1", Delivered, "carrier", None)
			.await
			.unwrap();
		let order: Order = storage
			.retrieve(StorageKey::Orders.as_str(), "o1")
			.await
			.unwrap();
		assert!(order.delivered_at.is_some());
	}
}
