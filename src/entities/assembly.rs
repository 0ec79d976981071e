//! Assembly catalog record - an ordered list of components with quantities

use serde::{Deserialize, Serialize};

/// Assembly classification as stored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssemblyType {
    Simple,
    Complex,
    Kit,
    SubAssembly,
    CustomPartAutogen,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AssemblyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyType::Simple => "SIMPLE",
            AssemblyType::Complex => "COMPLEX",
            AssemblyType::Kit => "KIT",
            AssemblyType::SubAssembly => "SUB_ASSEMBLY",
            AssemblyType::CustomPartAutogen => "CUSTOM_PART_AUTOGEN",
            AssemblyType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for AssemblyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssemblyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SIMPLE" => Ok(AssemblyType::Simple),
            "COMPLEX" => Ok(AssemblyType::Complex),
            "KIT" => Ok(AssemblyType::Kit),
            "SUB_ASSEMBLY" => Ok(AssemblyType::SubAssembly),
            "CUSTOM_PART_AUTOGEN" => Ok(AssemblyType::CustomPartAutogen),
            "UNKNOWN" => Ok(AssemblyType::Unknown),
            _ => Err(format!(
                "Invalid assembly type: {}. Use SIMPLE, COMPLEX, KIT, SUB_ASSEMBLY, CUSTOM_PART_AUTOGEN or UNKNOWN",
                s
            )),
        }
    }
}

/// One line of an assembly's component list
///
/// `id` references either another assembly or a part; which one is decided
/// by catalog lookup at expansion time, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Referenced assembly or part id
    #[serde(deserialize_with = "super::ids::id")]
    pub id: String,

    /// Quantity of the referenced item per one parent
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Free-form note carried over from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl Component {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            notes: None,
        }
    }
}

/// A catalog assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assembly {
    /// Stable identifier, e.g. `T2-BODY-48-60-HA`
    #[serde(deserialize_with = "super::ids::id")]
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(rename = "type", default)]
    pub assembly_type: AssemblyType,

    /// Components in catalog-declared order
    #[serde(default)]
    pub components: Vec<Component>,

    /// Accessory subcategory code (e.g. `720.601`) when this assembly is sold as an accessory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl Assembly {
    pub fn new(id: impl Into<String>, name: impl Into<String>, assembly_type: AssemblyType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assembly_type,
            components: Vec::new(),
            subcategory: None,
        }
    }

    /// Builder-style component append, used by fixtures
    pub fn with_component(mut self, id: impl Into<String>, quantity: u32) -> Self {
        self.components.push(Component::new(id, quantity));
        self
    }

    /// Sum of per-parent quantities across all direct components
    pub fn declared_quantity(&self) -> u32 {
        self.components.iter().map(|c| c.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_type_parsing() {
        assert_eq!("kit".parse::<AssemblyType>().unwrap(), AssemblyType::Kit);
        assert_eq!(
            "SUB_ASSEMBLY".parse::<AssemblyType>().unwrap(),
            AssemblyType::SubAssembly
        );
        assert!("widget".parse::<AssemblyType>().is_err());
    }

    #[test]
    fn test_unknown_type_deserializes_to_unknown() {
        let yaml = "id: A\nname: Thing\ntype: GIZMO\n";
        let asm: Assembly = serde_yml::from_str(yaml).unwrap();
        assert_eq!(asm.assembly_type, AssemblyType::Unknown);
        assert!(asm.components.is_empty());
    }

    #[test]
    fn test_component_quantity_defaults_to_one() {
        let yaml = r#"
id: T2-DL27-KIT
name: DL27 leg kit
type: KIT
components:
  - id: T2-DL27-LEG
    quantity: 4
  - id: T2-LEG-BOLT
"#;
        let asm: Assembly = serde_yml::from_str(yaml).unwrap();
        assert_eq!(asm.components.len(), 2);
        assert_eq!(asm.components[0].quantity, 4);
        assert_eq!(asm.components[1].quantity, 1);
        assert_eq!(asm.declared_quantity(), 5);
    }
}
