//! Registry trait for self-registering implementations.
//!
//! Each collaborator module (storage, notification, carrier, account) must
//! provide a Registry struct that implements this trait, declaring its
//! configuration name and factory function.

/// Base trait for implementation registries.
///
/// The builder resolves the `implementation` name found in a configuration
/// section against the registered factories; every implementation therefore
/// declares the name it answers to and how to construct itself.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the value of the section's `implementation` key,
	/// for example:
	/// - "memory" for storage.implementation = "memory"
	/// - "file" for storage.implementation = "file"
	/// - "log" for notification.implementation = "log"
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example
	/// `StorageFactory` for storage implementations or
	/// `CarrierFactory` for carrier adapters.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
