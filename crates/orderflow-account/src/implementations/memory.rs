//! In-memory identity directory and wallet ledger.
//!
//! Holds a seeded actor directory and wallet balances in concurrent maps.
//! Used in tests and development; production deployments put the real
//! identity provider and ledger behind the same trait.

use crate::{AccountError, AccountInterface};
use async_trait::async_trait;
use dashmap::DashMap;
use orderflow_types::{Actor, ConfigSchema, ImplementationRegistry, Role, Schema, ValidationError};
use rust_decimal::Decimal;
use std::sync::Arc;

/// In-memory account implementation.
///
/// Clones share the same directory and ledger.
#[derive(Clone)]
pub struct MemoryAccounts {
	actors: Arc<DashMap<String, Actor>>,
	balances: Arc<DashMap<String, Decimal>>,
}

impl MemoryAccounts {
	/// Creates an empty directory and ledger.
	pub fn new() -> Self {
		Self {
			actors: Arc::new(DashMap::new()),
			balances: Arc::new(DashMap::new()),
		}
	}

	/// Seeds one actor into the directory.
	pub fn seed_actor(&self, id: impl Into<String>, roles: Vec<Role>) {
		let id = id.into();
		self.actors.insert(id.clone(), Actor { id, roles });
	}
}

impl Default for MemoryAccounts {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AccountInterface for MemoryAccounts {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryAccountsSchema)
	}

	async fn resolve_actor(&self, id: &str) -> Result<Actor, AccountError> {
		self.actors
			.get(id)
			.map(|entry| entry.clone())
			.ok_or_else(|| AccountError::UnknownActor(id.to_string()))
	}

	async fn credit(&self, customer_id: &str, amount: Decimal) -> Result<(), AccountError> {
		let mut balance = self
			.balances
			.entry(customer_id.to_string())
			.or_insert(Decimal::ZERO);
		*balance += amount;
		tracing::info!(customer_id, %amount, new_balance = %*balance, "wallet credited");
		Ok(())
	}

	async fn balance(&self, customer_id: &str) -> Result<Decimal, AccountError> {
		Ok(self
			.balances
			.get(customer_id)
			.map(|b| *b)
			.unwrap_or(Decimal::ZERO))
	}
}

/// Configuration schema for MemoryAccounts.
pub struct MemoryAccountsSchema;

impl ConfigSchema for MemoryAccountsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory accounts have no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the memory account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::AccountFactory;

	fn factory() -> Self::Factory {
		create_accounts
	}
}

impl crate::AccountRegistry for Registry {}

/// Factory function to create a memory account backend from configuration.
pub fn create_accounts(_config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(MemoryAccounts::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn unknown_actor_is_an_error() {
		let accounts = MemoryAccounts::new();
		let result = accounts.resolve_actor("ghost").await;
		assert!(matches!(result, Err(AccountError::UnknownActor(_))));
	}

	#[tokio::test]
	async fn credits_accumulate() {
		let accounts = MemoryAccounts::new();
		accounts.credit("c1", Decimal::new(1050, 2)).await.unwrap();
		accounts.credit("c1", Decimal::new(950, 2)).await.unwrap();
		assert_eq!(accounts.balance("c1").await.unwrap(), Decimal::new(2000, 2));
	}

	#[tokio::test]
	async fn seeded_roles_resolve() {
		let accounts = MemoryAccounts::new();
		accounts.seed_actor("s1", vec![Role::Staff]);
		let actor = accounts.resolve_actor("s1").await.unwrap();
		assert!(actor.is_staff());
	}
}
