//! Timeline/stored-status reconciliation.
//!
//! The timeline is the single source of truth for an order's status; the
//! status field stored on the order record is a denormalized copy. This
//! service detects disagreement between the two, reports it, and can
//! force-repair the stored field from the timeline. Conflict resolution
//! against client caches is strictly server-wins: a client value is never
//! accepted, only compared.

use crate::state::{OrderStatusError, OrderStatusManager};
use chrono::{DateTime, Utc};
use orderflow_notification::NotificationService;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{
	latest_entry, ConflictResolution, LifecycleEvent, Order, OrderStatus, StorageKey, SyncEvent,
	SyncReport, SyncStatus, TimelineEntry,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error(transparent)]
	Order(#[from] OrderStatusError),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for SyncError {
	fn from(e: StorageError) -> Self {
		SyncError::Storage(e.to_string())
	}
}

/// Reconciles stored order status against the authoritative timeline.
pub struct DataSynchronizationService {
	storage: Arc<StorageService>,
	manager: Arc<OrderStatusManager>,
	notification: Arc<NotificationService>,
}

impl DataSynchronizationService {
	pub fn new(
		storage: Arc<StorageService>,
		manager: Arc<OrderStatusManager>,
		notification: Arc<NotificationService>,
	) -> Self {
		Self {
			storage,
			manager,
			notification,
		}
	}

	/// Returns the authoritative status for an order, recomputed from the
	/// timeline.
	///
	/// Read-only: a disagreeing stored field is left in place as evidence
	/// for `validate_data_consistency`; repair is a separate administrative
	/// step.
	pub async fn sync_order_status(&self, order_id: &str) -> Result<OrderStatus, SyncError> {
		Ok(self.manager.current_status(order_id).await?)
	}

	/// Compares a client's cached status against the server's.
	///
	/// The server value wins unconditionally; `was_conflict` only reports
	/// whether the client's view differed. A client timestamp at or past
	/// the server's latest entry is logged as informational divergence,
	/// never accepted as a write.
	pub async fn resolve_status_conflict(
		&self,
		order_id: &str,
		client_status: OrderStatus,
		client_timestamp: Option<DateTime<Utc>>,
	) -> Result<ConflictResolution, SyncError> {
		let server_status = self.manager.current_status(order_id).await?;
		let was_conflict = client_status != server_status;
		if was_conflict {
			let entries = self.load_timeline(order_id).await?;
			let server_timestamp = latest_entry(&entries).map(|e| e.timestamp);
			let client_claims_newer = match (client_timestamp, server_timestamp) {
				(Some(client), Some(server)) => client >= server,
				(Some(_), None) => true,
				_ => false,
			};
			tracing::info!(
				order_id,
				client = %client_status,
				server = %server_status,
				client_claims_newer,
				"divergent client status superseded"
			);
		}
		Ok(ConflictResolution {
			resolved: server_status,
			was_conflict,
		})
	}

	/// Returns true when the stored status field agrees with the timeline.
	///
	/// An empty timeline is consistent by definition: no transition has
	/// been audited yet, so the stored field has nothing to disagree with.
	pub async fn validate_data_consistency(&self, order_id: &str) -> Result<bool, SyncError> {
		let order = self.load_order(order_id).await?;
		let entries = self.load_timeline(order_id).await?;
		Ok(match latest_entry(&entries) {
			Some(entry) => entry.status == order.status,
			None => true,
		})
	}

	/// Force-repairs the stored status field from the timeline.
	///
	/// The repair bypasses transition validation on purpose: the timeline
	/// already is the audited history, and the stored field is only being
	/// brought back in line with it.
	pub async fn fix_data_inconsistency(&self, order_id: &str) -> Result<(), SyncError> {
		let _guard = self
			.storage
			.entity_lock(StorageKey::Orders.as_str(), order_id)
			.await;

		let mut order = self.load_order(order_id).await?;
		let entries = self.load_timeline(order_id).await?;
		let Some(entry) = latest_entry(&entries) else {
			return Ok(());
		};
		if entry.status == order.status {
			return Ok(());
		}

		let from = order.status;
		let to = entry.status;
		tracing::warn!(
			order_id,
			stored = %from,
			timeline = %to,
			"stored status disagrees with timeline; repairing"
		);
		order.status = to;
		order.updated_at = Utc::now();
		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;

		self.notification
			.send(LifecycleEvent::Sync(SyncEvent::StatusRepaired {
				order_id: order_id.to_string(),
				from,
				to,
			}))
			.await;
		Ok(())
	}

	/// Sweeps every stored order, repairing inconsistencies.
	///
	/// Per-order failures are recorded in the report and never abort the
	/// sweep; a corrupted record must not shadow the healthy ones.
	pub async fn sync_all_orders(&self) -> Result<SyncReport, SyncError> {
		let ids = self
			.storage
			.list_ids(StorageKey::Orders.as_str())
			.await?;
		let mut report = SyncReport::default();
		for order_id in ids {
			report.checked += 1;
			match self.sync_one(&order_id).await {
				Ok(repaired) => {
					if repaired {
						report.repaired += 1;
					}
				},
				Err(e) => {
					tracing::warn!(order_id = %order_id, error = %e, "order skipped during sweep");
					report.failures.push((order_id, e.to_string()));
				},
			}
		}
		tracing::info!(
			checked = report.checked,
			repaired = report.repaired,
			failed = report.failures.len(),
			"consistency sweep finished"
		);
		Ok(report)
	}

	/// Returns a consistency snapshot without mutating anything.
	pub async fn sync_status(&self, order_id: &str) -> Result<SyncStatus, SyncError> {
		let order = self.load_order(order_id).await?;
		let mut entries = self.load_timeline(order_id).await?;
		entries.sort_by_key(|e| e.timestamp);
		let latest = entries.last();
		Ok(SyncStatus {
			order_id: order_id.to_string(),
			current_status: latest.map(|e| e.status).unwrap_or(order.status),
			last_updated: latest.map(|e| e.timestamp),
			is_consistent: latest.map(|e| e.status == order.status).unwrap_or(true),
		})
	}

	async fn sync_one(&self, order_id: &str) -> Result<bool, SyncError> {
		if self.validate_data_consistency(order_id).await? {
			return Ok(false);
		}
		self.fix_data_inconsistency(order_id).await?;
		Ok(true)
	}

	async fn load_order(&self, order_id: &str) -> Result<Order, SyncError> {
		match self
			.storage
			.retrieve::<Order>(StorageKey::Orders.as_str(), order_id)
			.await
		{
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => Err(SyncError::OrderNotFound(order_id.to_string())),
			Err(e) => Err(e.into()),
		}
	}

	async fn load_timeline(&self, order_id: &str) -> Result<Vec<TimelineEntry>, SyncError> {
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
}
