//! Return/refund request types.
//!
//! A return request is opened by a customer after delivery and walks a
//! narrow state machine driven by staff decisions and carrier drop-off
//! confirmations. At most one non-terminal request exists per order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a return/refund request.
///
/// `RefundRejected` and `Refunded` are terminal. Each workflow operation
/// represents exactly one edge of this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
	/// Customer opened the request; staff decision pending.
	RefundRequested,
	/// Staff approved; customer may hand goods to the carrier.
	ReturnApproved,
	/// Staff rejected the request; terminal.
	RefundRejected,
	/// Goods confirmed in transit back to the warehouse.
	Returning,
	/// Goods received and inspected at the warehouse.
	ReturnReceived,
	/// Refund credited to the customer's wallet; terminal.
	Refunded,
}

impl ReturnStatus {
	/// Returns true for statuses with no outgoing transitions.
	pub fn is_final(&self) -> bool {
		matches!(self, ReturnStatus::RefundRejected | ReturnStatus::Refunded)
	}

	/// Human-facing display label for this status.
	pub fn label(&self) -> &'static str {
		match self {
			ReturnStatus::RefundRequested => "Refund requested",
			ReturnStatus::ReturnApproved => "Return approved",
			ReturnStatus::RefundRejected => "Refund rejected",
			ReturnStatus::Returning => "Returning",
			ReturnStatus::ReturnReceived => "Return received",
			ReturnStatus::Refunded => "Refunded",
		}
	}
}

impl fmt::Display for ReturnStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Coded reason a customer selects when opening a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
	/// Goods arrived damaged.
	Damaged,
	/// The wrong item was delivered.
	WrongItem,
	/// Item does not match its listing.
	NotAsDescribed,
	/// Customer changed their mind.
	ChangedMind,
	/// Anything else; see the free-text description.
	Other,
}

/// Bank payout details for the refund transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
	/// Name of the receiving bank.
	pub bank_name: String,
	/// Receiving account number.
	pub account_number: String,
	/// Name on the receiving account.
	pub account_holder: String,
}

/// Customer-supplied fields of a new return request.
///
/// Immutable after creation; only status, tracking and rejection fields
/// change later, and only through workflow transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSubmission {
	/// Coded reason for the return.
	pub reason: ReturnReason,
	/// Free-text description of the problem.
	pub description: String,
	/// Reference to uploaded evidence media, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub evidence_ref: Option<String>,
	/// Payout details for the refund.
	pub bank_info: BankInfo,
}

/// A return/refund request tied 1:1 to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
	/// Unique internal identifier.
	pub id: String,
	/// The order this request belongs to.
	pub order_id: String,
	/// Customer-facing token used at physical drop-off, distinct from `id`.
	pub return_code: String,
	/// Coded reason for the return.
	pub reason: ReturnReason,
	/// Free-text description of the problem.
	pub description: String,
	/// Reference to uploaded evidence media, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub evidence_ref: Option<String>,
	/// Payout details for the refund.
	pub bank_info: BankInfo,
	/// Current workflow status.
	pub status: ReturnStatus,
	/// Staff-supplied reason, set when the request is rejected.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rejection_reason: Option<String>,
	/// Carrier tracking reference for the return shipment, once booked.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tracking_ref: Option<String>,
	/// Staff member who processed the request, once decided.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub processed_by: Option<String>,
	/// Timestamp when the request was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the last mutation.
	pub updated_at: DateTime<Utc>,
}

impl ReturnRequest {
	/// Creates a new request in `RefundRequested` with a fresh id and
	/// return code.
	pub fn open(order_id: impl Into<String>, submission: ReturnSubmission) -> Self {
		let now = Utc::now();
		Self {
			id: Uuid::new_v4().to_string(),
			order_id: order_id.into(),
			return_code: generate_return_code(),
			reason: submission.reason,
			description: submission.description,
			evidence_ref: submission.evidence_ref,
			bank_info: submission.bank_info,
			status: ReturnStatus::RefundRequested,
			rejection_reason: None,
			tracking_ref: None,
			processed_by: None,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Generates a human-shareable return code.
///
/// The code identifies the request at a carrier drop-off counter, so it is
/// short, uppercase and prefixed rather than a raw uuid.
pub fn generate_return_code() -> String {
	let id = Uuid::new_v4().simple().to_string().to_uppercase();
	format!("RET-{}", &id[..10])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn submission() -> ReturnSubmission {
		ReturnSubmission {
			reason: ReturnReason::Damaged,
			description: "screen cracked on arrival".into(),
			evidence_ref: Some("media/abc123".into()),
			bank_info: BankInfo {
				bank_name: "First National".into(),
				account_number: "000123".into(),
				account_holder: "Jane Doe".into(),
			},
		}
	}

	#[test]
	fn open_starts_in_refund_requested() {
		let request = ReturnRequest::open("o1", submission());
		assert_eq!(request.status, ReturnStatus::RefundRequested);
		assert!(request.rejection_reason.is_none());
		assert!(request.tracking_ref.is_none());
	}

	#[test]
	fn return_code_shape() {
		let code = generate_return_code();
		assert!(code.starts_with("RET-"));
		assert_eq!(code.len(), 14);
		assert_eq!(code, code.to_uppercase());
	}

	#[test]
	fn terminal_return_statuses() {
		assert!(ReturnStatus::RefundRejected.is_final());
		assert!(ReturnStatus::Refunded.is_final());
		assert!(!ReturnStatus::Returning.is_final());
	}
}
