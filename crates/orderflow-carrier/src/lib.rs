//! Shipping-carrier module for the orderflow lifecycle system.
//!
//! This module abstracts the third-party carrier used for return pickups.
//! The return workflow books a pickup after approving a request and looks
//! up fees for display; both calls are best-effort from the core's
//! perspective, with failures logged rather than retried.

use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, ReturnRequest};
use rust_decimal::Decimal;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod flat;
}

/// Errors that can occur during carrier operations.
#[derive(Debug, Error)]
pub enum CarrierError {
	/// Error that occurs during communication with the carrier.
	#[error("Carrier unavailable: {0}")]
	Unavailable(String),
	/// Error that occurs when the carrier rejects a shipment request.
	#[error("Shipment rejected: {0}")]
	Rejected(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for carrier adapters.
#[async_trait]
pub trait CarrierInterface: Send + Sync {
	/// Returns the configuration schema for this carrier implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Books a return pickup for an approved request.
	///
	/// Returns the carrier's tracking reference for the return shipment.
	async fn create_return_shipment(
		&self,
		request: &ReturnRequest,
	) -> Result<String, CarrierError>;

	/// Quotes the shipping fee between two locations for a parcel weight.
	async fn lookup_fee(
		&self,
		origin: &str,
		destination: &str,
		weight_grams: u32,
	) -> Result<Decimal, CarrierError>;
}

/// Type alias for carrier factory functions.
pub type CarrierFactory = fn(&toml::Value) -> Result<Box<dyn CarrierInterface>, CarrierError>;

/// Registry trait for carrier implementations.
pub trait CarrierRegistry: ImplementationRegistry<Factory = CarrierFactory> {}

/// Get all registered carrier implementations.
pub fn get_all_implementations() -> Vec<(&'static str, CarrierFactory)> {
	use implementations::flat;

	vec![(flat::Registry::NAME, flat::Registry::factory())]
}

/// Service that manages carrier operations.
///
/// Wraps a carrier adapter and exposes the two calls the return workflow
/// needs.
pub struct CarrierService {
	/// The underlying carrier adapter.
	implementation: Box<dyn CarrierInterface>,
}

impl CarrierService {
	/// Creates a new CarrierService with the specified adapter.
	pub fn new(implementation: Box<dyn CarrierInterface>) -> Self {
		Self { implementation }
	}

	/// Books a return pickup, returning the tracking reference.
	pub async fn create_return_shipment(
		&self,
		request: &ReturnRequest,
	) -> Result<String, CarrierError> {
		self.implementation.create_return_shipment(request).await
	}

	/// Quotes the shipping fee for a parcel.
	pub async fn lookup_fee(
		&self,
		origin: &str,
		destination: &str,
		weight_grams: u32,
	) -> Result<Decimal, CarrierError> {
		self.implementation
			.lookup_fee(origin, destination, weight_grams)
			.await
	}
}
