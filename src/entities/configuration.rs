//! Order configuration payload - customer info plus per-build selections
//!
//! Every sub-configuration is an explicit record with required fields. The
//! payload is schema-checked before it is deserialized into these types (see
//! [`crate::schema::validate`]), so field-level problems are reported before
//! any catalog access happens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category tag applied to accessories unless the selection overrides it
pub const ACCESSORY_CATEGORY: &str = "ACCESSORY";

/// Manual language for the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "EN")]
    English,
    #[serde(rename = "FR")]
    French,
    #[serde(rename = "ES")]
    Spanish,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "EN"),
            Language::French => write!(f, "FR"),
            Language::Spanish => write!(f, "ES"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub po_number: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub want_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Full order payload as submitted by the order-creation flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfiguration {
    pub customer: CustomerInfo,
    /// Build numbers in the order they should be processed
    pub build_numbers: Vec<String>,
    /// Keyed by build number
    #[serde(default)]
    pub configurations: HashMap<String, BuildConfiguration>,
    /// Accessory selections keyed by build number
    #[serde(default)]
    pub accessories: HashMap<String, Vec<AccessorySelection>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowDirection {
    LeftToRight,
    RightToLeft,
}

/// Configuration of one physical unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub sink_model_id: String,
    /// Sink width in inches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Sink length in inches
    pub length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pegboard: Option<PegboardSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_direction: Option<WorkflowDirection>,
    #[serde(default)]
    pub basins: Vec<BasinConfiguration>,
    #[serde(default)]
    pub faucets: Vec<FaucetConfiguration>,
    #[serde(default)]
    pub sprayers: Vec<SprayerConfiguration>,
    /// Explicit control box; when absent it is derived from the basin mix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_box_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegboardSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pegboard_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub size: PegboardSize,
}

/// Pegboard sizing choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "option", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PegboardSize {
    /// Pick the standard panel covering the sink length
    SameAsSink,
    /// Explicit dimensions; always yields a custom part number
    Custom { width: u32, length: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasinConfiguration {
    /// `E_SINK`, `E_SINK_DI` or `E_DRAIN`
    pub basin_type: String,
    /// Width x length x depth, e.g. `24X20X8`
    pub basin_size: String,
    #[serde(default)]
    pub addons: Vec<String>,
}

impl BasinConfiguration {
    /// Parse `basin_size` into `(width, length, depth)`
    ///
    /// The schema already enforces the `NxNxN` shape; this returns `None`
    /// only for values that bypassed validation.
    pub fn dimensions(&self) -> Option<(u32, u32, u32)> {
        let mut parts = self
            .basin_size
            .split(['x', 'X'])
            .map(|p| p.trim().parse::<u32>());
        let width = parts.next()?.ok()?;
        let length = parts.next()?.ok()?;
        let depth = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((width, length, depth))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetConfiguration {
    pub faucet_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl FaucetConfiguration {
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// A sprayer code or a list of codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SprayerTypes {
    Single(String),
    Many(Vec<String>),
}

impl SprayerTypes {
    pub fn codes(&self) -> Vec<&str> {
        match self {
            SprayerTypes::Single(code) => vec![code.as_str()],
            SprayerTypes::Many(codes) => codes.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayerConfiguration {
    pub sprayer_type: SprayerTypes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Applied to each code; defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl SprayerConfiguration {
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorySelection {
    pub assembly_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl AccessorySelection {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(ACCESSORY_CATEGORY)
    }
}
