//! Entity type definitions

pub mod assembly;
pub mod configuration;
pub mod ids;
pub mod order;
pub mod part;

pub use assembly::{Assembly, AssemblyType, Component};
pub use configuration::OrderConfiguration;
pub use order::{HistoryEntry, Order};
pub use part::Part;
