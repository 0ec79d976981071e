//! CLI command implementations

pub mod bom;
pub mod catalog;
pub mod order;
