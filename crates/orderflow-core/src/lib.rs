//! Core order-lifecycle engine.
//!
//! Owns the transition rule table and every workflow built on top of it:
//! status management with an audit timeline, delivery confirmation,
//! return/refund processing, eligibility evaluation, timeline/stored-state
//! reconciliation and the presentation-facing transition queries. The
//! storage, notification, carrier and account collaborators are resolved
//! from configuration by the engine builder and injected as services.

pub mod builder;
pub mod confirmation;
pub mod eligibility;
pub mod returns;
pub mod state;
pub mod sync;
pub mod ui;

pub use builder::{EngineError, LifecycleEngineBuilder};
pub use confirmation::{ConfirmationError, DeliveryConfirmationWorkflow, ReasonPolicy};
pub use eligibility::{EligibilityEvaluator, EligibilityResult};
pub use returns::{ReturnError, ReturnRequestWorkflow};
pub use state::{OrderStatusError, OrderStatusManager};
pub use sync::{DataSynchronizationService, SyncError};
pub use ui::{NextAction, UIIntegrationService};

use orderflow_account::AccountService;
use orderflow_carrier::CarrierService;
use orderflow_config::Config;
use orderflow_notification::NotificationService;
use orderflow_storage::StorageService;
use std::sync::Arc;

/// The assembled lifecycle engine.
///
/// Produced by [`LifecycleEngineBuilder`]; exposes each workflow through an
/// accessor. All workflows share the same storage service, so the
/// per-entity locks coordinate across them.
pub struct LifecycleEngine {
	config: Config,
	storage: Arc<StorageService>,
	notification: Arc<NotificationService>,
	carrier: Arc<CarrierService>,
	accounts: Arc<AccountService>,
	manager: Arc<OrderStatusManager>,
	eligibility: Arc<EligibilityEvaluator>,
	confirmations: Arc<DeliveryConfirmationWorkflow>,
	returns: Arc<ReturnRequestWorkflow>,
	sync: Arc<DataSynchronizationService>,
	ui: UIIntegrationService,
}

impl std::fmt::Debug for LifecycleEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LifecycleEngine")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl LifecycleEngine {
	/// The validated configuration the engine was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Shared storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Best-effort notification service.
	pub fn notification(&self) -> &Arc<NotificationService> {
		&self.notification
	}

	/// Shipping-carrier service.
	pub fn carrier(&self) -> &Arc<CarrierService> {
		&self.carrier
	}

	/// Identity and wallet-ledger service.
	pub fn accounts(&self) -> &Arc<AccountService> {
		&self.accounts
	}

	/// Order status manager.
	pub fn manager(&self) -> &Arc<OrderStatusManager> {
		&self.manager
	}

	/// Return-eligibility evaluator.
	pub fn eligibility(&self) -> &Arc<EligibilityEvaluator> {
		&self.eligibility
	}

	/// Delivery-confirmation workflow.
	pub fn confirmations(&self) -> &Arc<DeliveryConfirmationWorkflow> {
		&self.confirmations
	}

	/// Return/refund workflow.
	pub fn returns(&self) -> &Arc<ReturnRequestWorkflow> {
		&self.returns
	}

	/// Timeline/stored-status reconciliation service.
	pub fn sync(&self) -> &Arc<DataSynchronizationService> {
		&self.sync
	}

	/// Presentation-facing transition queries.
	pub fn ui(&self) -> &UIIntegrationService {
		&self.ui
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	//! Shared fixtures for the workflow tests. Everything runs against the
	//! in-memory backends.

	use crate::confirmation::{DeliveryConfirmationWorkflow, ReasonPolicy};
	use crate::eligibility::EligibilityEvaluator;
	use crate::returns::ReturnRequestWorkflow;
	use crate::state::OrderStatusManager;
	use crate::sync::DataSynchronizationService;
	use chrono::{Duration, Utc};
	use orderflow_account::implementations::memory::MemoryAccounts;
	use orderflow_account::AccountService;
	use orderflow_carrier::implementations::flat::FlatCarrier;
	use orderflow_carrier::CarrierService;
	use orderflow_notification::implementations::memory::MemoryNotifier;
	use orderflow_notification::NotificationService;
	use orderflow_storage::implementations::memory::MemoryStorage;
	use orderflow_storage::StorageService;
	use orderflow_types::{
		BankInfo, Order, OrderStatus, ReturnReason, ReturnSubmission, Role, StorageKey,
	};
	use rust_decimal::Decimal;
	use std::sync::Arc;
	use uuid::Uuid;

	/// Storage service over a fresh in-memory backend.
	pub fn test_storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	/// Status manager plus its storage and an inspectable notifier.
	pub fn test_manager() -> (OrderStatusManager, Arc<StorageService>, MemoryNotifier) {
		let storage = test_storage();
		let notifier = MemoryNotifier::new();
		let notification = Arc::new(NotificationService::new(Box::new(notifier.clone())));
		let manager = OrderStatusManager::new(storage.clone(), notification);
		(manager, storage, notifier)
	}

	/// Confirmation workflow wired to a shared manager and storage.
	pub fn test_confirmation_workflow() -> (
		DeliveryConfirmationWorkflow,
		Arc<OrderStatusManager>,
		Arc<StorageService>,
		MemoryNotifier,
	) {
		let storage = test_storage();
		let notifier = MemoryNotifier::new();
		let notification = Arc::new(NotificationService::new(Box::new(notifier.clone())));
		let manager = Arc::new(OrderStatusManager::new(
			storage.clone(),
			notification.clone(),
		));
		let workflow = DeliveryConfirmationWorkflow::new(
			storage.clone(),
			manager.clone(),
			notification,
			ReasonPolicy::default(),
		);
		(workflow, manager, storage, notifier)
	}

	/// Synchronization service wired to a shared manager and storage.
	pub fn test_sync_service() -> (
		DataSynchronizationService,
		Arc<OrderStatusManager>,
		Arc<StorageService>,
		MemoryNotifier,
	) {
		let storage = test_storage();
		let notifier = MemoryNotifier::new();
		let notification = Arc::new(NotificationService::new(Box::new(notifier.clone())));
		let manager = Arc::new(OrderStatusManager::new(
			storage.clone(),
			notification.clone(),
		));
		let sync = DataSynchronizationService::new(storage.clone(), manager.clone(), notification);
		(sync, manager, storage, notifier)
	}

	/// Full return-workflow fixture with a seeded staff actor.
	pub struct ReturnFixture {
		pub workflow: Arc<ReturnRequestWorkflow>,
		pub accounts: Arc<AccountService>,
		pub storage: Arc<StorageService>,
		directory: MemoryAccounts,
	}

	impl ReturnFixture {
		/// Stores the order and registers its customer in the directory.
		pub async fn seed(&self, order: &Order) {
			self.directory
				.seed_actor(order.customer_id.clone(), vec![Role::Customer]);
			self.storage
				.store(StorageKey::Orders.as_str(), &order.id, order)
				.await
				.unwrap();
		}

		/// Reloads an order from storage.
		pub async fn order(&self, order_id: &str) -> Order {
			self.storage
				.retrieve(StorageKey::Orders.as_str(), order_id)
				.await
				.unwrap()
		}
	}

	/// Builds the return workflow against in-memory collaborators, with
	/// "staff1" seeded as a staff actor.
	pub async fn test_return_workflow() -> ReturnFixture {
		let storage = test_storage();
		let notifier = MemoryNotifier::new();
		let notification = Arc::new(NotificationService::new(Box::new(notifier.clone())));
		let manager = Arc::new(OrderStatusManager::new(
			storage.clone(),
			notification.clone(),
		));
		let eligibility = Arc::new(EligibilityEvaluator::new(storage.clone(), 48));
		let carrier = Arc::new(CarrierService::new(Box::new(FlatCarrier::default())));

		let directory = MemoryAccounts::new();
		directory.seed_actor("staff1", vec![Role::Staff]);
		let accounts = Arc::new(AccountService::new(Box::new(directory.clone())));

		let workflow = Arc::new(ReturnRequestWorkflow::new(
			storage.clone(),
			manager,
			eligibility,
			carrier,
			accounts.clone(),
			notification,
		));
		ReturnFixture {
			workflow,
			accounts,
			storage,
			directory,
		}
	}

	/// Stores a minimal order in the given status.
	pub async fn seed_order(
		storage: &Arc<StorageService>,
		id: &str,
		customer_id: &str,
		status: OrderStatus,
	) {
		let now = Utc::now();
		let order = Order {
			id: id.to_string(),
			customer_id: customer_id.to_string(),
			status,
			return_marker: None,
			total_amount: Decimal::new(9999, 2),
			created_at: now,
			delivered_at: status.is_delivered_marker().then_some(now),
			updated_at: now,
		};
		storage
			.store(StorageKey::Orders.as_str(), id, &order)
			.await
			.unwrap();
	}

	/// An order delivered `ago` before now, with fresh unique ids.
	pub fn order_delivered_ago(ago: Duration) -> Order {
		let now = Utc::now();
		Order {
			id: Uuid::new_v4().to_string(),
			customer_id: format!("c-{}", Uuid::new_v4().simple()),
			status: OrderStatus::Delivered,
			return_marker: None,
			total_amount: Decimal::new(9999, 2),
			created_at: now - ago - Duration::days(3),
			delivered_at: Some(now - ago),
			updated_at: now - ago,
		}
	}

	/// A plausible return submission.
	pub fn submission() -> ReturnSubmission {
		ReturnSubmission {
			reason: ReturnReason::Damaged,
			description: "screen cracked on arrival".into(),
			evidence_ref: None,
			bank_info: BankInfo {
				bank_name: "First National".into(),
				account_number: "000123".into(),
				account_holder: "Jane Doe".into(),
			},
		}
	}
}
