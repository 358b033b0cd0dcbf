//! Return-eligibility evaluation.
//!
//! Decides whether a return request may be opened for an order. Rules run
//! in a fixed order and the first failure wins, so the reason a customer
//! sees is always the most fundamental one.

use chrono::Utc;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{Order, ReturnRequest, ReturnStatus, StorageKey};
use std::sync::Arc;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityResult {
	/// True when a return request may be opened.
	pub eligible: bool,
	/// Human reason for the first failed rule, when ineligible.
	pub reason: Option<String>,
}

impl EligibilityResult {
	fn ok() -> Self {
		Self {
			eligible: true,
			reason: None,
		}
	}

	fn fail(reason: &str) -> Self {
		Self {
			eligible: false,
			reason: Some(reason.to_string()),
		}
	}
}

/// Evaluates return-eligibility rules against an order.
pub struct EligibilityEvaluator {
	storage: Arc<StorageService>,
	/// Post-delivery window during which a return may be opened, in hours.
	window_hours: u64,
}

impl EligibilityEvaluator {
	pub fn new(storage: Arc<StorageService>, window_hours: u64) -> Self {
		Self {
			storage,
			window_hours,
		}
	}

	/// Checks the rules in order; the first failure wins.
	///
	/// 1. The order must carry the delivered marker (a prior return cycle
	///    may have reverted the literal status, so `Delivered` and
	///    `ConfirmedByCustomer` both qualify).
	/// 2. No open (non-terminal) return request may exist for the order.
	/// 3. Delivery must lie within the eligibility window.
	pub async fn evaluate(&self, order: &Order) -> Result<EligibilityResult, StorageError> {
		let delivered_at = match order.delivered_at {
			Some(ts) if order.status.is_delivered_marker() => ts,
			_ => return Ok(EligibilityResult::fail("order not delivered")),
		};

		if self.has_open_request(&order.id).await? {
			return Ok(EligibilityResult::fail("return already requested"));
		}

		let elapsed = Utc::now().signed_duration_since(delivered_at);
		if elapsed.num_seconds() > (self.window_hours * 3600) as i64 {
			return Ok(EligibilityResult::fail("return window expired"));
		}

		Ok(EligibilityResult::ok())
	}

	/// Looks up an order by id and evaluates the rules against it.
	pub async fn check(&self, order_id: &str) -> Result<EligibilityResult, StorageError> {
		let order: Order = self
			.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await?;
		self.evaluate(&order).await
	}

	/// Hours left in the eligibility window, rounded down, never negative.
	///
	/// Returns 0 for orders with no delivery timestamp.
	pub fn remaining_eligibility_hours(&self, order: &Order) -> u64 {
		let Some(delivered_at) = order.delivered_at else {
			return 0;
		};
		let elapsed = Utc::now().signed_duration_since(delivered_at);
		let elapsed_secs = elapsed.num_seconds().max(0) as u64;
		let window_secs = self.window_hours * 3600;
		window_secs.saturating_sub(elapsed_secs) / 3600
	}

	/// True when a non-terminal return request exists for the order.
	async fn has_open_request(&self, order_id: &str) -> Result<bool, StorageError> {
		let request_id = match self
			.storage
			.retrieve::<String>(StorageKey::ReturnByOrder.as_str(), order_id)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => return Ok(false),
			Err(e) => return Err(e),
		};
		let request: ReturnRequest = self
			.storage
			.retrieve(StorageKey::ReturnRequests.as_str(), &request_id)
			.await?;
		Ok(!request.status.is_final())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{order_delivered_ago, test_storage};
	use chrono::Duration;
	use orderflow_types::OrderStatus;

	fn evaluator(storage: &Arc<StorageService>) -> EligibilityEvaluator {
		EligibilityEvaluator::new(storage.clone(), 48)
	}

	#[tokio::test]
	async fn undelivered_order_is_ineligible() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let mut order = order_delivered_ago(Duration::hours(1));
		order.status = OrderStatus::Shipping;
		order.delivered_at = None;

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(!result.eligible);
		assert_eq!(result.reason.as_deref(), Some("order not delivered"));
	}

	#[tokio::test]
	async fn boundary_just_inside_window_is_eligible_with_zero_remaining() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(47) + Duration::minutes(59));

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(result.eligible);
		assert_eq!(evaluator.remaining_eligibility_hours(&order), 0);
	}

	#[tokio::test]
	async fn boundary_just_past_window_is_ineligible() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(48) + Duration::seconds(1));

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(!result.eligible);
		assert_eq!(result.reason.as_deref(), Some("return window expired"));
		assert_eq!(evaluator.remaining_eligibility_hours(&order), 0);
	}

	#[tokio::test]
	async fn remaining_hours_rounds_down() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(10) + Duration::minutes(30));
		// 37.5 hours remain; rounds down to 37.
		assert_eq!(evaluator.remaining_eligibility_hours(&order), 37);
	}

	#[tokio::test]
	async fn confirmed_by_customer_still_carries_delivered_marker() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let mut order = order_delivered_ago(Duration::hours(5));
		order.status = OrderStatus::ConfirmedByCustomer;

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(result.eligible);
	}

	#[tokio::test]
	async fn check_by_id_loads_the_stored_order() {
		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(2));
		storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await
			.unwrap();

		let result = evaluator.check(&order.id).await.unwrap();
		assert!(result.eligible);

		let missing = evaluator.check("ghost").await;
		assert!(matches!(missing, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn existing_open_request_blocks_a_second() {
		use orderflow_types::{BankInfo, ReturnReason, ReturnRequest, ReturnSubmission};

		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(2));

		let request = ReturnRequest::open(
			&order.id,
			ReturnSubmission {
				reason: ReturnReason::Other,
				description: "does not fit".into(),
				evidence_ref: None,
				bank_info: BankInfo {
					bank_name: "First National".into(),
					account_number: "000123".into(),
					account_holder: "Jane Doe".into(),
				},
			},
		);
		storage
			.store(StorageKey::ReturnRequests.as_str(), &request.id, &request)
			.await
			.unwrap();
		storage
			.store(StorageKey::ReturnByOrder.as_str(), &order.id, &request.id)
			.await
			.unwrap();

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(!result.eligible);
		assert_eq!(result.reason.as_deref(), Some("return already requested"));
	}

	#[tokio::test]
	async fn terminal_request_allows_a_new_cycle() {
		use orderflow_types::{BankInfo, ReturnReason, ReturnRequest, ReturnSubmission};

		let storage = test_storage();
		let evaluator = evaluator(&storage);
		let order = order_delivered_ago(Duration::hours(2));

		let mut request = ReturnRequest::open(
			&order.id,
			ReturnSubmission {
				reason: ReturnReason::Other,
				description: "does not fit".into(),
				evidence_ref: None,
				bank_info: BankInfo {
					bank_name: "First National".into(),
					account_number: "000123".into(),
					account_holder: "Jane Doe".into(),
				},
			},
		);
		request.status = ReturnStatus::RefundRejected;
		storage
			.store(StorageKey::ReturnRequests.as_str(), &request.id, &request)
			.await
			.unwrap();
		storage
			.store(StorageKey::ReturnByOrder.as_str(), &order.id, &request.id)
			.await
			.unwrap();

		let result = evaluator.evaluate(&order).await.unwrap();
		assert!(result.eligible);
	}
}
