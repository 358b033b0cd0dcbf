//! Notification module for the orderflow lifecycle system.
//!
//! This module provides the best-effort notification collaborator. Events
//! are handed to a sink implementation after a transition has been
//! validated and persisted; a sink failure is logged and never propagated,
//! so a committed transition can never be rolled back by a notification
//! problem.

use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, LifecycleEvent};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod memory;
}

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotificationError {
	/// Error that occurs when the sink cannot deliver the event.
	#[error("Delivery failed: {0}")]
	DeliveryFailed(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for notification sinks.
///
/// Implementations decide how an event reaches the outside world (email,
/// push, a log line). Delivery semantics are at-most-once; the core never
/// retries.
#[async_trait]
pub trait NotificationInterface: Send + Sync {
	/// Returns the configuration schema for this notification implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Delivers one lifecycle event.
	async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotificationError>;
}

/// Type alias for notification factory functions.
pub type NotificationFactory =
	fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotificationError>;

/// Registry trait for notification implementations.
pub trait NotificationRegistry: ImplementationRegistry<Factory = NotificationFactory> {}

/// Get all registered notification implementations.
pub fn get_all_implementations() -> Vec<(&'static str, NotificationFactory)> {
	use implementations::{log, memory};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Service that manages best-effort notification delivery.
///
/// Wraps a sink implementation; `send` swallows sink errors after logging
/// them, which is the only delivery contract the lifecycle core relies on.
pub struct NotificationService {
	/// The underlying sink implementation.
	implementation: Box<dyn NotificationInterface>,
}

impl NotificationService {
	/// Creates a new NotificationService with the specified sink.
	pub fn new(implementation: Box<dyn NotificationInterface>) -> Self {
		Self { implementation }
	}

	/// Delivers an event, logging and swallowing any sink failure.
	pub async fn send(&self, event: LifecycleEvent) {
		if let Err(e) = self.implementation.notify(&event).await {
			tracing::warn!(error = %e, ?event, "notification delivery failed; transition stands");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryNotifier;
	use orderflow_types::{OrderEvent, OrderStatus};

	struct FailingSink;

	#[async_trait]
	impl NotificationInterface for FailingSink {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			unimplemented!("not used in tests")
		}

		async fn notify(&self, _event: &LifecycleEvent) -> Result<(), NotificationError> {
			Err(NotificationError::DeliveryFailed("smtp down".into()))
		}
	}

	fn event() -> LifecycleEvent {
		LifecycleEvent::Order(OrderEvent::StatusChanged {
			order_id: "o1".into(),
			from: OrderStatus::Pending,
			to: OrderStatus::Confirmed,
			updated_by: "staff1".into(),
		})
	}

	#[tokio::test]
	async fn send_swallows_sink_failures() {
		let service = NotificationService::new(Box::new(FailingSink));
		// Must not panic or propagate.
		service.send(event()).await;
	}

	#[tokio::test]
	async fn memory_sink_collects_events() {
		let sink = MemoryNotifier::new();
		let service = NotificationService::new(Box::new(sink.clone()));
		service.send(event()).await;
		assert_eq!(sink.events().len(), 1);
	}
}
