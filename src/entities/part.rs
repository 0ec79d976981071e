//! Part catalog record - a leaf with no further components

use serde::{Deserialize, Serialize};

/// A catalog part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Catalog identifier referenced by assembly components
    #[serde(deserialize_with = "super::ids::id")]
    pub id: String,

    /// Human-facing part number shown on the BOM
    #[serde(deserialize_with = "super::ids::part_number")]
    pub part_number: String,

    pub name: String,

    /// Part classification (e.g. `COMPONENT`, `MATERIAL`), free-form
    #[serde(rename = "type", default = "default_part_type")]
    pub part_type: String,
}

fn default_part_type() -> String {
    "COMPONENT".to_string()
}

impl Part {
    pub fn new(id: impl Into<String>, part_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            part_number: part_number.into(),
            name: name.into(),
            part_type: default_part_type(),
        }
    }
}
