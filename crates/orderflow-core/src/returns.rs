//! Return/refund request workflow.
//!
//! Drives the return state machine: RefundRequested -> ReturnApproved |
//! RefundRejected, ReturnApproved -> Returning -> ReturnReceived ->
//! Refunded. Each operation represents exactly one edge, so unlike the
//! order validator there is no "enumerate alternatives" step: a mismatch
//! simply names the actual and expected statuses.
//!
//! Order-side effects (the "return in progress" / "delivered" marker
//! reverts) always go through the status manager; this workflow never
//! writes an order field directly.

use crate::eligibility::EligibilityEvaluator;
use crate::state::{OrderStatusError, OrderStatusManager};
use chrono::Utc;
use orderflow_account::AccountService;
use orderflow_carrier::CarrierService;
use orderflow_notification::NotificationService;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{
	LifecycleEvent, ReturnEvent, ReturnMarker, ReturnRequest, ReturnStatus, ReturnSubmission,
	StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in the return/refund workflow.
#[derive(Debug, Error)]
pub enum ReturnError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Return request not found: {0}")]
	ReturnNotFound(String),
	#[error("Return not eligible: {reason}")]
	NotEligible { reason: String },
	#[error("Return request is '{actual}' but must be '{expected}' for this operation")]
	InvalidReturnStatus {
		actual: ReturnStatus,
		expected: ReturnStatus,
	},
	#[error("Actor '{actor}' is not authorized for this operation")]
	Unauthorized { actor: String },
	#[error(transparent)]
	Order(#[from] OrderStatusError),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for ReturnError {
	fn from(e: StorageError) -> Self {
		ReturnError::Storage(e.to_string())
	}
}

/// Drives return requests through their state machine.
pub struct ReturnRequestWorkflow {
	storage: Arc<StorageService>,
	manager: Arc<OrderStatusManager>,
	eligibility: Arc<EligibilityEvaluator>,
	carrier: Arc<CarrierService>,
	accounts: Arc<AccountService>,
	notification: Arc<NotificationService>,
}

impl ReturnRequestWorkflow {
	pub fn new(
		storage: Arc<StorageService>,
		manager: Arc<OrderStatusManager>,
		eligibility: Arc<EligibilityEvaluator>,
		carrier: Arc<CarrierService>,
		accounts: Arc<AccountService>,
		notification: Arc<NotificationService>,
	) -> Self {
		Self {
			storage,
			manager,
			eligibility,
			carrier,
			accounts,
			notification,
		}
	}

	/// Opens a return request for a delivered order.
	///
	/// The duplicate pre-check and the insert run under the order's
	/// return-slot lock, so two concurrent attempts serialize and the
	/// second deterministically fails with `NotEligible`.
	pub async fn create_return_request(
		&self,
		order_id: &str,
		customer_id: &str,
		submission: ReturnSubmission,
	) -> Result<ReturnRequest, ReturnError> {
		let order = self
			.manager
			.load_order(order_id)
			.await
			.map_err(|e| match e {
				OrderStatusError::OrderNotFound(id) => ReturnError::OrderNotFound(id),
				other => ReturnError::Order(other),
			})?;
		if order.customer_id != customer_id {
			return Err(ReturnError::Unauthorized {
				actor: customer_id.to_string(),
			});
		}

		let request = {
			let _slot = self
				.storage
				.entity_lock(StorageKey::ReturnByOrder.as_str(), order_id)
				.await;

			let result = self.eligibility.evaluate(&order).await?;
			if !result.eligible {
				return Err(ReturnError::NotEligible {
					reason: result
						.reason
						.unwrap_or_else(|| "not eligible".to_string()),
				});
			}

			let request = ReturnRequest::open(order_id, submission);
			self.storage
				.store(StorageKey::ReturnRequests.as_str(), &request.id, &request)
				.await?;
			self.storage
				.store(
					StorageKey::ReturnByCode.as_str(),
					&request.return_code,
					&request.id,
				)
				.await?;
			self.storage
				.store(StorageKey::ReturnByOrder.as_str(), order_id, &request.id)
				.await?;
			request
		};

		self.manager
			.set_return_marker(
				order_id,
				Some(ReturnMarker::Requested),
				customer_id,
				"return requested",
			)
			.await?;

		tracing::info!(
			request_id = %request.id,
			order_id,
			return_code = %request.return_code,
			"return request opened"
		);
		self.notification
			.send(LifecycleEvent::Return(ReturnEvent::Requested {
				request_id: request.id.clone(),
				order_id: order_id.to_string(),
				return_code: request.return_code.clone(),
			}))
			.await;
		Ok(request)
	}

	/// Staff approves a requested return.
	///
	/// Books the carrier pickup and stores its tracking reference; the
	/// booking is best-effort and a carrier failure does not undo the
	/// approval.
	pub async fn approve(
		&self,
		request_id: &str,
		staff_id: &str,
	) -> Result<ReturnRequest, ReturnError> {
		self.require_staff(staff_id).await?;
		let request = self
			.transition(request_id, ReturnStatus::RefundRequested, |request| {
				request.status = ReturnStatus::ReturnApproved;
				request.processed_by = Some(staff_id.to_string());
			})
			.await?;

		// Best-effort pickup booking; failure is logged, not retried.
		let request = match self.carrier.create_return_shipment(&request).await {
			Ok(tracking_ref) => {
				self.set_tracking_ref(&request.id, tracking_ref).await?
			},
			Err(e) => {
				tracing::warn!(
					request_id = %request.id,
					error = %e,
					"return pickup booking failed; approval stands"
				);
				request
			},
		};

		self.manager
			.set_return_marker(
				&request.order_id,
				Some(ReturnMarker::InProgress),
				staff_id,
				"return approved",
			)
			.await?;
		Ok(request)
	}

	/// Staff rejects a requested return.
	///
	/// Records the rejection reason and reverts the order's externally
	/// visible marker to plain "delivered".
	pub async fn reject(
		&self,
		request_id: &str,
		reason: &str,
		staff_id: &str,
	) -> Result<ReturnRequest, ReturnError> {
		self.require_staff(staff_id).await?;
		let request = self
			.transition(request_id, ReturnStatus::RefundRequested, |request| {
				request.status = ReturnStatus::RefundRejected;
				request.rejection_reason = Some(reason.to_string());
				request.processed_by = Some(staff_id.to_string());
			})
			.await?;

		self.manager
			.clear_return_marker(&request.order_id, staff_id, "return rejected")
			.await?;
		Ok(request)
	}

	/// Carrier drop-off counter confirms the customer handed over the
	/// goods.
	///
	/// Looked up by the human-shareable return code rather than the
	/// internal id: the counter only ever sees the code.
	pub async fn confirm_shipping(&self, return_code: &str) -> Result<ReturnRequest, ReturnError> {
		let request_id = match self
			.storage
			.retrieve::<String>(StorageKey::ReturnByCode.as_str(), return_code)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => {
				return Err(ReturnError::ReturnNotFound(return_code.to_string()))
			},
			Err(e) => return Err(e.into()),
		};
		self.transition(&request_id, ReturnStatus::ReturnApproved, |request| {
			request.status = ReturnStatus::Returning;
		})
		.await
	}

	/// Staff confirms the returned goods arrived at the warehouse.
	pub async fn confirm_receipt(
		&self,
		request_id: &str,
		staff_id: &str,
	) -> Result<ReturnRequest, ReturnError> {
		self.require_staff(staff_id).await?;
		self.transition(request_id, ReturnStatus::Returning, |request| {
			request.status = ReturnStatus::ReturnReceived;
		})
		.await
	}

	/// Staff completes the refund.
	///
	/// The transition is persisted first; the wallet credit and marker
	/// revert follow. A ledger failure after the commit is logged for
	/// manual reconciliation and never rolls the transition back.
	pub async fn complete_refund(
		&self,
		request_id: &str,
		staff_id: &str,
	) -> Result<ReturnRequest, ReturnError> {
		self.require_staff(staff_id).await?;
		let request = self
			.transition(request_id, ReturnStatus::ReturnReceived, |request| {
				request.status = ReturnStatus::Refunded;
				request.processed_by = Some(staff_id.to_string());
			})
			.await?;

		let order = self.manager.load_order(&request.order_id).await?;
		if let Err(e) = self
			.accounts
			.credit(&order.customer_id, order.total_amount)
			.await
		{
			tracing::error!(
				request_id = %request.id,
				customer_id = %order.customer_id,
				error = %e,
				"wallet credit failed after refund commit; manual reconciliation required"
			);
		} else {
			self.notification
				.send(LifecycleEvent::Return(ReturnEvent::RefundCompleted {
					request_id: request.id.clone(),
					order_id: order.id.clone(),
					customer_id: order.customer_id.clone(),
					amount: order.total_amount,
				}))
				.await;
		}

		self.manager
			.clear_return_marker(&request.order_id, staff_id, "refund completed")
			.await?;
		Ok(request)
	}

	/// Returns a request by its internal id.
	pub async fn get(&self, request_id: &str) -> Result<ReturnRequest, ReturnError> {
		match self
			.storage
			.retrieve::<ReturnRequest>(StorageKey::ReturnRequests.as_str(), request_id)
			.await
		{
			Ok(request) => Ok(request),
			Err(StorageError::NotFound) => {
				Err(ReturnError::ReturnNotFound(request_id.to_string()))
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Returns the request attached to an order, if one exists.
	pub async fn find_by_order(&self, order_id: &str) -> Result<Option<ReturnRequest>, ReturnError> {
		let request_id = match self
			.storage
			.retrieve::<String>(StorageKey::ReturnByOrder.as_str(), order_id)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		self.get(&request_id).await.map(Some)
	}

	/// Applies one edge of the return state machine.
	///
	/// Loads the request under its entity lock, requires the exact
	/// expected current status, mutates, persists and notifies.
	async fn transition<F>(
		&self,
		request_id: &str,
		expected: ReturnStatus,
		mutate: F,
	) -> Result<ReturnRequest, ReturnError>
	where
		F: FnOnce(&mut ReturnRequest),
	{
		let _guard = self
			.storage
			.entity_lock(StorageKey::ReturnRequests.as_str(), request_id)
			.await;

		let mut request = self.get(request_id).await?;
		if request.status != expected {
			return Err(ReturnError::InvalidReturnStatus {
				actual: request.status,
				expected,
			});
		}
		let from = request.status;
		mutate(&mut request);
		request.updated_at = Utc::now();
		self.storage
			.update(StorageKey::ReturnRequests.as_str(), request_id, &request)
			.await?;

		tracing::info!(
			request_id,
			order_id = %request.order_id,
			from = %from,
			to = %request.status,
			"return request updated"
		);
		self.notification
			.send(LifecycleEvent::Return(ReturnEvent::StatusChanged {
				request_id: request_id.to_string(),
				order_id: request.order_id.clone(),
				from,
				to: request.status,
			}))
			.await;
		Ok(request)
	}

	/// Stores the carrier tracking reference on a request.
	async fn set_tracking_ref(
		&self,
		request_id: &str,
		tracking_ref: String,
	) -> Result<ReturnRequest, ReturnError> {
		let _guard = self
			.storage
			.entity_lock(StorageKey::ReturnRequests.as_str(), request_id)
			.await;
		let mut request = self.get(request_id).await?;
		request.tracking_ref = Some(tracking_ref);
		request.updated_at = Utc::now();
		self.storage
			.update(StorageKey::ReturnRequests.as_str(), request_id, &request)
			.await?;
		Ok(request)
	}

	/// Resolves a staff actor or fails with `Unauthorized`.
	async fn require_staff(&self, staff_id: &str) -> Result<(), ReturnError> {
		let actor = self
			.accounts
			.resolve_actor(staff_id)
			.await
			.map_err(|_| ReturnError::Unauthorized {
				actor: staff_id.to_string(),
			})?;
		if !actor.is_staff() {
			return Err(ReturnError::Unauthorized {
				actor: staff_id.to_string(),
			});
		}
		Ok(())
	}
}
