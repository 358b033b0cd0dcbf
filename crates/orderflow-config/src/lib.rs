//! Configuration module for the orderflow lifecycle system.
//!
//! This module provides structures and utilities for managing lifecycle
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set before the engine builder resolves any implementation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the lifecycle engine.
///
/// Contains all sections required for the engine to operate: service
/// identity, the storage backend, the notification sink, the carrier
/// adapter, the account/ledger backend and the workflow policies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: ImplementationConfig,
	/// Configuration for the notification sink.
	pub notification: ImplementationConfig,
	/// Configuration for the carrier adapter.
	pub carrier: ImplementationConfig,
	/// Configuration for the identity/ledger backend.
	pub account: ImplementationConfig,
	/// Return-eligibility policy.
	#[serde(default)]
	pub returns: ReturnsConfig,
	/// Delivery-confirmation policy.
	#[serde(default)]
	pub confirmation: ConfirmationConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// One collaborator section: which implementation to use and its options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImplementationConfig {
	/// Name the implementation registered under (e.g. "memory", "file").
	pub implementation: String,
	/// Implementation-specific options, validated by its ConfigSchema.
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

/// Returns an empty TOML table, the default for option-less sections.
fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}

/// Return-eligibility policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReturnsConfig {
	/// Length of the post-delivery window during which a return may be
	/// opened, in hours.
	#[serde(default = "default_window_hours")]
	pub window_hours: u64,
}

impl Default for ReturnsConfig {
	fn default() -> Self {
		Self {
			window_hours: default_window_hours(),
		}
	}
}

/// Returns the default eligibility window: two days.
fn default_window_hours() -> u64 {
	48
}

/// Delivery-confirmation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmationConfig {
	/// Minimum length of a rejection reason, in characters.
	#[serde(default = "default_min_reason_len")]
	pub min_reason_len: usize,
	/// Maximum length of a rejection reason, in characters.
	#[serde(default = "default_max_reason_len")]
	pub max_reason_len: usize,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			min_reason_len: default_min_reason_len(),
			max_reason_len: default_max_reason_len(),
		}
	}
}

fn default_min_reason_len() -> usize {
	10
}

fn default_max_reason_len() -> usize {
	500
}

impl Config {
	/// Loads configuration from a TOML file and validates it.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		Self::from_toml_str(&raw)
	}

	/// Parses configuration from a TOML string and validates it.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates cross-field constraints the type system cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"service.id must not be empty".into(),
			));
		}
		for (section, implementation) in [
			("storage", &self.storage),
			("notification", &self.notification),
			("carrier", &self.carrier),
			("account", &self.account),
		] {
			if implementation.implementation.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"{}.implementation must not be empty",
					section
				)));
			}
		}
		if self.returns.window_hours == 0 {
			return Err(ConfigError::Validation(
				"returns.window_hours must be at least 1".into(),
			));
		}
		if self.confirmation.min_reason_len > self.confirmation.max_reason_len {
			return Err(ConfigError::Validation(
				"confirmation.min_reason_len must not exceed max_reason_len".into(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
		[service]
		id = "orderflow-dev"

		[storage]
		implementation = "memory"

		[notification]
		implementation = "log"

		[carrier]
		implementation = "flat"

		[account]
		implementation = "memory"
	"#;

	#[test]
	fn minimal_config_parses_with_defaults() {
		let config = Config::from_toml_str(MINIMAL).unwrap();
		assert_eq!(config.service.id, "orderflow-dev");
		assert_eq!(config.returns.window_hours, 48);
		assert_eq!(config.confirmation.min_reason_len, 10);
		assert_eq!(config.confirmation.max_reason_len, 500);
	}

	#[test]
	fn implementation_options_pass_through() {
		let raw = format!(
			"{}\n[storage.config]\nstorage_path = \"/var/lib/orderflow\"\n",
			MINIMAL
		);
		let config = Config::from_toml_str(&raw).unwrap();
		assert_eq!(
			config
				.storage
				.config
				.get("storage_path")
				.and_then(|v| v.as_str()),
			Some("/var/lib/orderflow")
		);
	}

	#[test]
	fn empty_service_id_rejected() {
		let raw = MINIMAL.replace("orderflow-dev", "  ");
		let err = Config::from_toml_str(&raw).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn zero_window_rejected() {
		let raw = format!("{}\n[returns]\nwindow_hours = 0\n", MINIMAL);
		assert!(Config::from_toml_str(&raw).is_err());
	}

	#[test]
	fn missing_section_is_a_parse_error() {
		let raw = "[service]\nid = \"x\"\n";
		let err = Config::from_toml_str(raw).unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
