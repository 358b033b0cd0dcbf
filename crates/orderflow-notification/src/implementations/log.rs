//! Tracing-based notification sink.
//!
//! Renders each lifecycle event as a structured log line. This is the
//! default sink for deployments where real channels (email, push) are
//! wired outside the core.

use crate::{NotificationError, NotificationInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, LifecycleEvent, Schema, ValidationError};

/// Notification sink that logs events via `tracing`.
pub struct LogNotifier;

#[async_trait]
impl NotificationInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotificationError> {
		tracing::info!(?event, "lifecycle notification");
		Ok(())
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The log sink has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the log notification implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::NotificationFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotificationRegistry for Registry {}

/// Factory function to create a log notification sink from configuration.
pub fn create_notifier(
	_config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotificationError> {
	Ok(Box::new(LogNotifier))
}
