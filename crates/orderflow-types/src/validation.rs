//! Configuration validation types for ensuring type-safe configurations.
//!
//! Collaborator implementations (storage backends, notification sinks,
//! carrier adapters) each declare a schema for their own TOML section.
//! The builder validates sections against these schemas before
//! constructing any implementation, so misconfiguration fails fast at
//! startup rather than at first use.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when a field's type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer value with optional inclusive bounds.
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A boolean value.
	Boolean,
}

/// Type alias for custom field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// One field of a configuration schema.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator run after the type check.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}
}

/// Defines a validation schema for one TOML configuration section.
///
/// A schema consists of required fields that must be present and optional
/// fields that may be present. Each field has a type and optional custom
/// validation logic.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Checks that all required fields are present, that every present
	/// field has the expected type and bounds, and runs custom validators
	/// where defined.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			check_field(field, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				check_field(field, value)?;
			}
		}

		Ok(())
	}
}

/// Validates one field's type, bounds and custom validator.
fn check_field(field: &Field, value: &toml::Value) -> Result<(), ValidationError> {
	match field.field_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(ValidationError::TypeMismatch {
					field: field.name.clone(),
					expected: "string".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| ValidationError::TypeMismatch {
					field: field.name.clone(),
					expected: "integer".to_string(),
					actual: value.type_str().to_string(),
				})?;
			if let Some(min_val) = min {
				if int_val < min_val {
					return Err(ValidationError::InvalidValue {
						field: field.name.clone(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}
			if let Some(max_val) = max {
				if int_val > max_val {
					return Err(ValidationError::InvalidValue {
						field: field.name.clone(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(ValidationError::TypeMismatch {
					field: field.name.clone(),
					expected: "boolean".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
	}

	if let Some(validator) = &field.validator {
		validator(value).map_err(|msg| ValidationError::InvalidValue {
			field: field.name.clone(),
			message: msg,
		})?;
	}

	Ok(())
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Each collaborator implementation provides one of these so the builder
/// can validate its configuration section before instantiation.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![Field::new("path", FieldType::String)],
			vec![Field::new(
				"window_hours",
				FieldType::Integer {
					min: Some(1),
					max: Some(24 * 30),
				},
			)],
		)
	}

	#[test]
	fn missing_required_field() {
		let config: toml::Value = toml::from_str("window_hours = 48").unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "path"));
	}

	#[test]
	fn integer_bounds_enforced() {
		let config: toml::Value = toml::from_str("path = \"/tmp\"\nwindow_hours = 0").unwrap();
		assert!(schema().validate(&config).is_err());

		let config: toml::Value = toml::from_str("path = \"/tmp\"\nwindow_hours = 48").unwrap();
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn type_mismatch_reported() {
		let config: toml::Value = toml::from_str("path = 7").unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::TypeMismatch { .. }));
	}
}
