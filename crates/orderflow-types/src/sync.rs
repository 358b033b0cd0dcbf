//! Derived synchronization/consistency report types.
//!
//! These records are computed on demand by the synchronization service and
//! never persisted; the timeline remains the single source of truth.

use crate::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an order's externally visible synchronization state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
	/// Order the snapshot describes.
	pub order_id: String,
	/// Authoritative status recomputed from the timeline.
	pub current_status: OrderStatus,
	/// Timestamp of the latest recorded transition, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_updated: Option<DateTime<Utc>>,
	/// Whether the stored status field agrees with the timeline.
	pub is_consistent: bool,
}

/// Outcome of reconciling a client's cached status against the server.
///
/// The server value is returned unconditionally; the conflict flag is
/// informational only and never accepts a client write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
	/// The authoritative status after resolution.
	pub resolved: OrderStatus,
	/// True when the client's view differed from the server's.
	pub was_conflict: bool,
}

/// Aggregate outcome of a bulk consistency sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
	/// Number of orders examined.
	pub checked: usize,
	/// Number of orders whose stored status was force-repaired.
	pub repaired: usize,
	/// Per-order failures: (order id, error description).
	pub failures: Vec<(String, String)>,
}

impl SyncReport {
	/// Returns true when every order was examined without error.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}
