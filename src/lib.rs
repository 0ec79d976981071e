//! CleanStation configurator core
//!
//! Turns a validated sink order configuration into a consolidated bill of
//! materials, and moves orders through their production lifecycle under
//! role-based transition rules.

pub mod cli;
pub mod core;
pub mod entities;
pub mod logging;
pub mod schema;
pub mod yaml;
