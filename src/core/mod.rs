//! Core module - BOM engine, order workflow and persistence

pub mod bom;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod generator;
pub mod notify;
pub mod rules;
pub mod store;
pub mod team;
pub mod workflow;

pub use bom::{consolidate, flatten, BomExpander, BomNode, BomReport, FlatRow};
pub use catalog::{Catalog, CatalogError, CatalogIssue, CatalogStore};
pub use config::{Config, ConfigError};
pub use entity::OrderStatus;
pub use generator::generate_bom;
pub use notify::{LogNotifier, NoopNotifier, NotificationTrigger, NotifyError, QcPhase, ThreadedNotifier};
pub use store::{OrderStore, SqliteOrderStore, StoreError};
pub use team::{ActingUser, Role};
pub use workflow::{
    can_access_order, is_valid_transition, suggested_transitions, validate_transition,
    StatusService, TransitionError, TransitionOutcome, TransitionRequest,
};
