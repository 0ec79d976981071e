//! Schema registry - embedded JSON schemas

use rust_embed::Embed;
use std::collections::HashMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Schema for the order configuration payload
pub const ORDER_CONFIGURATION: &str = "order-configuration";

/// Registry of JSON schemas keyed by name (file stem without `.schema.json`)
pub struct SchemaRegistry {
    schemas: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Create a new schema registry with embedded schemas
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        for filename in EmbeddedSchemas::iter() {
            let Some(name) = filename.strip_suffix(".schema.json") else {
                continue;
            };
            if let Some(file) = EmbeddedSchemas::get(&filename) {
                if let Ok(content) = std::str::from_utf8(&file.data) {
                    schemas.insert(name.to_string(), content.to_string());
                }
            }
        }

        Self { schemas }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.schemas.get(name).map(|s| s.as_str())
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_configuration_schema_embedded() {
        let registry = SchemaRegistry::new();
        assert!(registry.has_schema(ORDER_CONFIGURATION));
        let schema: serde_json::Value =
            serde_json::from_str(registry.get(ORDER_CONFIGURATION).unwrap()).unwrap();
        assert_eq!(schema["title"], "Order configuration");
    }
}
