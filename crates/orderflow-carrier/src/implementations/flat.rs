//! Deterministic flat-fee carrier adapter.
//!
//! Synthesizes tracking references locally and quotes a flat base fee plus
//! a per-kilogram surcharge. Suitable for development and tests; a real
//! carrier integration lives behind the same trait outside this workspace.

use crate::{CarrierError, CarrierInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, ReturnRequest, Schema, ValidationError};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Flat-fee carrier with locally generated tracking numbers.
pub struct FlatCarrier {
	/// Base fee charged for any shipment.
	base_fee: Decimal,
	/// Additional fee per whole kilogram.
	per_kg_fee: Decimal,
}

impl FlatCarrier {
	/// Creates a carrier with the given fee schedule.
	pub fn new(base_fee: Decimal, per_kg_fee: Decimal) -> Self {
		Self { base_fee, per_kg_fee }
	}
}

impl Default for FlatCarrier {
	fn default() -> Self {
		Self::new(Decimal::new(1500, 2), Decimal::new(250, 2))
	}
}

#[async_trait]
impl CarrierInterface for FlatCarrier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FlatCarrierSchema)
	}

	async fn create_return_shipment(
		&self,
		request: &ReturnRequest,
	) -> Result<String, CarrierError> {
		let tracking = format!(
			"TRK-{}",
			Uuid::new_v4().simple().to_string()[..12].to_uppercase()
		);
		tracing::info!(
			request_id = %request.id,
			return_code = %request.return_code,
			tracking_ref = %tracking,
			"booked return pickup"
		);
		Ok(tracking)
	}

	async fn lookup_fee(
		&self,
		_origin: &str,
		_destination: &str,
		weight_grams: u32,
	) -> Result<Decimal, CarrierError> {
		let kilos = Decimal::from(weight_grams.div_ceil(1000));
		Ok(self.base_fee + self.per_kg_fee * kilos)
	}
}

/// Configuration schema for FlatCarrier.
pub struct FlatCarrierSchema;

impl ConfigSchema for FlatCarrierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_fee_cents", FieldType::Integer { min: Some(0), max: None }),
				Field::new("per_kg_fee_cents", FieldType::Integer { min: Some(0), max: None }),
			],
		);
		schema.validate(config)
	}
}

/// Registry entry for the flat carrier implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "flat";
	type Factory = crate::CarrierFactory;

	fn factory() -> Self::Factory {
		create_carrier
	}
}

impl crate::CarrierRegistry for Registry {}

/// Factory function to create a flat carrier from configuration.
///
/// Configuration parameters (all optional):
/// - `base_fee_cents`: flat fee in cents, default 1500
/// - `per_kg_fee_cents`: per-kilogram fee in cents, default 250
pub fn create_carrier(config: &toml::Value) -> Result<Box<dyn CarrierInterface>, CarrierError> {
	FlatCarrierSchema
		.validate(config)
		.map_err(|e| CarrierError::Configuration(e.to_string()))?;

	let cents = |key: &str, default: i64| -> Decimal {
		let raw = config.get(key).and_then(|v| v.as_integer()).unwrap_or(default);
		Decimal::new(raw, 2)
	};
	Ok(Box::new(FlatCarrier::new(
		cents("base_fee_cents", 1500),
		cents("per_kg_fee_cents", 250),
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_types::{BankInfo, ReturnReason, ReturnRequest, ReturnSubmission};

	fn request() -> ReturnRequest {
		ReturnRequest::open(
			"o1",
			ReturnSubmission {
				reason: ReturnReason::Damaged,
				description: "arrived broken".into(),
				evidence_ref: None,
				bank_info: BankInfo {
					bank_name: "First National".into(),
					account_number: "000123".into(),
					account_holder: "Jane Doe".into(),
				},
			},
		)
	}

	#[tokio::test]
	async fn tracking_refs_are_unique() {
		let carrier = FlatCarrier::default();
		let a = carrier.create_return_shipment(&request()).await.unwrap();
		let b = carrier.create_return_shipment(&request()).await.unwrap();
		assert!(a.starts_with("TRK-"));
		assert_ne!(a, b);
	}

	#[tokio::test]
	async fn fee_rounds_weight_up_to_kilograms() {
		let carrier = FlatCarrier::new(Decimal::new(1000, 2), Decimal::new(100, 2));
		// 1500g rounds up to 2kg: 10.00 + 2 * 1.00
		let fee = carrier.lookup_fee("HAN", "SGN", 1500).await.unwrap();
		assert_eq!(fee, Decimal::new(1200, 2));
	}
}
