//! Embedded JSON schemas and payload validation

pub mod registry;
pub mod validate;

pub use registry::SchemaRegistry;
pub use validate::{
    parse_order_configuration, validate_order_configuration, FieldError, OrderValidator,
    ValidationError,
};
