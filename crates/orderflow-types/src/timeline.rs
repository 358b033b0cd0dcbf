//! Append-only audit timeline types.

use crate::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted status change, recorded immutably.
///
/// Entries are appended per order and never mutated or deleted; the entry
/// with the latest timestamp is the authoritative source for the order's
/// current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
	/// Order this entry belongs to.
	pub order_id: String,
	/// Status the order held after this change.
	pub status: OrderStatus,
	/// Identifier of the actor who caused the change.
	pub updated_by: String,
	/// Optional free-text note attached by the actor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// When the change was accepted.
	pub timestamp: DateTime<Utc>,
}

impl TimelineEntry {
	/// Creates an entry timestamped now.
	pub fn now(
		order_id: impl Into<String>,
		status: OrderStatus,
		updated_by: impl Into<String>,
		notes: Option<String>,
	) -> Self {
		Self {
			order_id: order_id.into(),
			status,
			updated_by: updated_by.into(),
			notes,
			timestamp: Utc::now(),
		}
	}
}

/// Returns the latest entry of a timeline by timestamp.
///
/// Appends normally arrive in order, but the derivation deliberately scans
/// by timestamp rather than position so a reordered store still resolves
/// the same answer.
pub fn latest_entry(entries: &[TimelineEntry]) -> Option<&TimelineEntry> {
	entries.iter().max_by_key(|e| e.timestamp)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn latest_entry_is_by_timestamp_not_position() {
		let base = Utc::now();
		let mut first = TimelineEntry::now("o1", OrderStatus::Pending, "staff", None);
		first.timestamp = base;
		let mut second = TimelineEntry::now("o1", OrderStatus::Confirmed, "staff", None);
		second.timestamp = base + Duration::seconds(5);

		// Reversed insertion order must not change the answer.
		let entries = vec![second.clone(), first];
		assert_eq!(latest_entry(&entries), Some(&second));
	}

	#[test]
	fn empty_timeline_has_no_latest() {
		assert!(latest_entry(&[]).is_none());
	}
}
