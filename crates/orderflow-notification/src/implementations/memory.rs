//! Collecting notification sink for tests.

use crate::{NotificationError, NotificationInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, LifecycleEvent, Schema, ValidationError};
use std::sync::{Arc, Mutex};

/// Notification sink that records every event in memory.
///
/// Clones share the same buffer, so a test can keep one handle and hand
/// another to the service under test.
#[derive(Clone)]
pub struct MemoryNotifier {
	events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl MemoryNotifier {
	/// Creates a new empty MemoryNotifier.
	pub fn new() -> Self {
		Self {
			events: Arc::new(Mutex::new(Vec::new())),
		}
	}

	/// Returns a snapshot of all recorded events.
	pub fn events(&self) -> Vec<LifecycleEvent> {
		self.events.lock().expect("notifier lock poisoned").clone()
	}
}

impl Default for MemoryNotifier {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl NotificationInterface for MemoryNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryNotifierSchema)
	}

	async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotificationError> {
		self.events
			.lock()
			.map_err(|_| NotificationError::DeliveryFailed("notifier lock poisoned".into()))?
			.push(event.clone());
		Ok(())
	}
}

/// Configuration schema for MemoryNotifier.
pub struct MemoryNotifierSchema;

impl ConfigSchema for MemoryNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the memory notification implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::NotificationFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotificationRegistry for Registry {}

/// Factory function to create a memory notification sink from configuration.
pub fn create_notifier(
	_config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotificationError> {
	Ok(Box::new(MemoryNotifier::new()))
}
