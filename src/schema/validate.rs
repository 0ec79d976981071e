//! Order configuration validation
//!
//! Runs before any catalog access: the raw JSON is checked against the
//! embedded schema and every violation is collected with its JSON pointer.
//! Only a schema-clean payload is deserialized into typed records.

use miette::Diagnostic;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::core::rules;
use crate::entities::OrderConfiguration;
use crate::schema::registry::{SchemaRegistry, ORDER_CONFIGURATION};

/// A single field-level problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON pointer into the payload; empty for the document root
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Order configuration is not valid JSON: {0}")]
    #[diagnostic(code(cleanstation::validate::syntax))]
    Syntax(#[from] serde_json::Error),

    #[error("Order configuration has {} invalid field(s)", .0.len())]
    #[diagnostic(
        code(cleanstation::validate::fields),
        help("fix the listed fields and resubmit")
    )]
    Fields(Vec<FieldError>),

    #[error("Schema '{0}' is missing or does not compile")]
    #[diagnostic(code(cleanstation::validate::schema))]
    Schema(String),
}

impl ValidationError {
    /// Field errors carried by this error, empty for non-field failures
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields(errors) => errors,
            _ => &[],
        }
    }
}

/// Compiled validator for order configuration payloads
pub struct OrderValidator {
    validator: jsonschema::Validator,
}

impl OrderValidator {
    pub fn new() -> Result<Self, ValidationError> {
        let registry = SchemaRegistry::new();
        let schema_text = registry
            .get(ORDER_CONFIGURATION)
            .ok_or_else(|| ValidationError::Schema(ORDER_CONFIGURATION.to_string()))?;
        let schema: serde_json::Value = serde_json::from_str(schema_text)
            .map_err(|_| ValidationError::Schema(ORDER_CONFIGURATION.to_string()))?;
        let validator = jsonschema::validator_for(&schema)
            .map_err(|_| ValidationError::Schema(ORDER_CONFIGURATION.to_string()))?;
        Ok(Self { validator })
    }

    /// Collect every field error in `value`
    pub fn check(&self, value: &serde_json::Value) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self
            .validator
            .iter_errors(value)
            .map(|e| FieldError::new(e.instance_path.to_string(), e.to_string()))
            .collect();
        errors.extend(check_build_numbers(value));
        errors.extend(check_basin_counts(value));
        errors
    }

    /// Validate and deserialize a payload
    pub fn validate(&self, value: &serde_json::Value) -> Result<OrderConfiguration, ValidationError> {
        let errors = self.check(value);
        if !errors.is_empty() {
            return Err(ValidationError::Fields(errors));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::Fields(vec![FieldError::new("", e.to_string())]))
    }
}

/// Build numbers must be unique within an order
fn check_build_numbers(value: &serde_json::Value) -> Vec<FieldError> {
    let Some(builds) = value.get("buildNumbers").and_then(|b| b.as_array()) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    builds
        .iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let id = b.as_str()?;
            if seen.insert(id) {
                None
            } else {
                Some(FieldError::new(
                    format!("/buildNumbers/{}", i),
                    format!("duplicate build number {}", id),
                ))
            }
        })
        .collect()
}

/// Each T2-B model is built for a fixed number of basins
fn check_basin_counts(value: &serde_json::Value) -> Vec<FieldError> {
    let Some(configs) = value.get("configurations").and_then(|c| c.as_object()) else {
        return Vec::new();
    };
    configs
        .iter()
        .filter_map(|(build, config)| {
            let model = config.get("sinkModelId")?.as_str()?;
            let expected = rules::model_basin_count(model)?;
            let found = config
                .get("basins")
                .and_then(|b| b.as_array())
                .map_or(0, |b| b.len());
            (found != expected).then(|| {
                FieldError::new(
                    format!("/configurations/{}/basins", build),
                    format!(
                        "sink model {} takes {} basin(s), found {}",
                        model, expected, found
                    ),
                )
            })
        })
        .collect()
}

/// Validate an already parsed JSON payload
pub fn validate_order_configuration(
    value: &serde_json::Value,
) -> Result<OrderConfiguration, ValidationError> {
    OrderValidator::new()?.validate(value)
}

/// Parse and validate a JSON payload
pub fn parse_order_configuration(text: &str) -> Result<OrderConfiguration, ValidationError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    validate_order_configuration(&value)
}
