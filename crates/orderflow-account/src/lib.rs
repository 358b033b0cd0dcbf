//! Account module for the orderflow lifecycle system.
//!
//! This module provides the identity and wallet-ledger collaborators. The
//! workflows resolve actors here for authorization checks and credit the
//! customer's wallet balance exactly once when a refund completes.

use async_trait::async_trait;
use orderflow_types::{Actor, ConfigSchema, ImplementationRegistry};
use rust_decimal::Decimal;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when an actor id cannot be resolved.
	#[error("Unknown actor: {0}")]
	UnknownActor(String),
	/// Error that occurs when a wallet operation fails.
	#[error("Ledger error: {0}")]
	Ledger(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for identity/ledger implementations.
///
/// Covers the two collaborator concerns the workflows need: resolving an
/// actor id to its roles, and atomically incrementing a customer's wallet
/// balance.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Returns the configuration schema for this account implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Resolves an actor id to its identity and roles.
	async fn resolve_actor(&self, id: &str) -> Result<Actor, AccountError>;

	/// Atomically credits a customer's wallet balance.
	async fn credit(&self, customer_id: &str, amount: Decimal) -> Result<(), AccountError>;

	/// Returns a customer's current wallet balance.
	async fn balance(&self, customer_id: &str) -> Result<Decimal, AccountError>;
}

/// Type alias for account factory functions.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Get all registered account implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// Service that manages identity resolution and wallet credits.
pub struct AccountService {
	/// The underlying identity/ledger implementation.
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	/// Creates a new AccountService with the specified implementation.
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Resolves an actor id to its identity and roles.
	pub async fn resolve_actor(&self, id: &str) -> Result<Actor, AccountError> {
		self.implementation.resolve_actor(id).await
	}

	/// Atomically credits a customer's wallet balance.
	pub async fn credit(&self, customer_id: &str, amount: Decimal) -> Result<(), AccountError> {
		self.implementation.credit(customer_id, amount).await
	}

	/// Returns a customer's current wallet balance.
	pub async fn balance(&self, customer_id: &str) -> Result<Decimal, AccountError> {
		self.implementation.balance(customer_id).await
	}
}
