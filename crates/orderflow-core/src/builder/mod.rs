//! Engine builder.
//!
//! Resolves the configured implementation of each collaborator through its
//! crate's registry, wires the services and workflows together and returns
//! a ready `LifecycleEngine`. The transition table is validated here once,
//! at startup; an incomplete table is a build error, never a runtime
//! surprise.

use crate::confirmation::{DeliveryConfirmationWorkflow, ReasonPolicy};
use crate::eligibility::EligibilityEvaluator;
use crate::returns::ReturnRequestWorkflow;
use crate::state::{rules, OrderStatusManager};
use crate::sync::DataSynchronizationService;
use crate::ui::UIIntegrationService;
use crate::LifecycleEngine;
use orderflow_account::AccountService;
use orderflow_carrier::CarrierService;
use orderflow_config::Config;
use orderflow_notification::NotificationService;
use orderflow_storage::StorageService;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Service error in {service}: {message}")]
	Service { service: String, message: String },
}

/// Builder that assembles a `LifecycleEngine` from configuration.
pub struct LifecycleEngineBuilder {
	config: Config,
}

impl LifecycleEngineBuilder {
	/// Creates a builder from validated configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Resolves every collaborator and wires the engine together.
	pub fn build(self) -> Result<LifecycleEngine, EngineError> {
		// An incomplete transition table must fail the build, not a request.
		rules::validate_configuration().map_err(EngineError::Config)?;

		let config = self.config;
		let storage = Arc::new(StorageService::new(resolve(
			"storage",
			&config.storage.implementation,
			&config.storage.config,
			orderflow_storage::get_all_implementations(),
		)?));
		let notification = Arc::new(NotificationService::new(resolve(
			"notification",
			&config.notification.implementation,
			&config.notification.config,
			orderflow_notification::get_all_implementations(),
		)?));
		let carrier = Arc::new(CarrierService::new(resolve(
			"carrier",
			&config.carrier.implementation,
			&config.carrier.config,
			orderflow_carrier::get_all_implementations(),
		)?));
		let accounts = Arc::new(AccountService::new(resolve(
			"account",
			&config.account.implementation,
			&config.account.config,
			orderflow_account::get_all_implementations(),
		)?));

		let manager = Arc::new(OrderStatusManager::new(
			storage.clone(),
			notification.clone(),
		));
		let eligibility = Arc::new(EligibilityEvaluator::new(
			storage.clone(),
			config.returns.window_hours,
		));
		let confirmations = Arc::new(DeliveryConfirmationWorkflow::new(
			storage.clone(),
			manager.clone(),
			notification.clone(),
			ReasonPolicy {
				min_len: config.confirmation.min_reason_len,
				max_len: config.confirmation.max_reason_len,
			},
		));
		let returns = Arc::new(ReturnRequestWorkflow::new(
			storage.clone(),
			manager.clone(),
			eligibility.clone(),
			carrier.clone(),
			accounts.clone(),
			notification.clone(),
		));
		let sync = Arc::new(DataSynchronizationService::new(
			storage.clone(),
			manager.clone(),
			notification.clone(),
		));

		tracing::info!(service_id = %config.service.id, "lifecycle engine built");

		Ok(LifecycleEngine {
			config,
			storage,
			notification,
			carrier,
			accounts,
			manager: manager.clone(),
			eligibility,
			confirmations,
			returns,
			sync,
			ui: UIIntegrationService::new(manager),
		})
	}
}

/// Resolves one collaborator implementation by its registered name.
fn resolve<T: ?Sized, E: std::fmt::Display>(
	section: &str,
	name: &str,
	options: &toml::Value,
	implementations: Vec<(&'static str, fn(&toml::Value) -> Result<Box<T>, E>)>,
) -> Result<Box<T>, EngineError> {
	let factory = implementations
		.iter()
		.find(|(candidate, _)| *candidate == name)
		.map(|(_, factory)| *factory)
		.ok_or_else(|| {
			let known: Vec<&str> = implementations.iter().map(|(n, _)| *n).collect();
			EngineError::Config(format!(
				"unknown {} implementation '{}'; available: {}",
				section,
				name,
				known.join(", ")
			))
		})?;
	factory(options).map_err(|e| EngineError::Service {
		service: section.to_string(),
		message: e.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const MEMORY_CONFIG: &str = r#"
		[service]
		id = "orderflow-test"

		[storage]
		implementation = "memory"

		[notification]
		implementation = "memory"

		[carrier]
		implementation = "flat"

		[account]
		implementation = "memory"
	"#;

	#[tokio::test]
	async fn builds_from_memory_config() {
		let _ = tracing_subscriber::fmt().with_test_writer().try_init();
		let config = Config::from_toml_str(MEMORY_CONFIG).unwrap();
		let engine = LifecycleEngineBuilder::new(config).build().unwrap();
		assert_eq!(engine.config().service.id, "orderflow-test");

		// The wired engine serves reads end to end.
		let err = engine
			.ui()
			.valid_next_states("ghost")
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			crate::state::OrderStatusError::OrderNotFound(_)
		));
	}

	#[test]
	fn unknown_implementation_is_a_build_error() {
		let mut config = Config::from_toml_str(MEMORY_CONFIG).unwrap();
		config.storage.implementation = "postgres".into();
		let err = LifecycleEngineBuilder::new(config).build().unwrap_err();
		assert!(matches!(err, EngineError::Config(_)));
		assert!(err.to_string().contains("postgres"));
	}

	#[test]
	fn misconfigured_backend_is_a_service_error() {
		let mut config = Config::from_toml_str(MEMORY_CONFIG).unwrap();
		// The file backend requires storage_path; none is given.
		config.storage.implementation = "file".into();
		let err = LifecycleEngineBuilder::new(config).build().unwrap_err();
		assert!(matches!(err, EngineError::Service { ref service, .. } if service == "storage"));
	}
}
