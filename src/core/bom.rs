//! BOM expansion, consolidation and flattening
//!
//! [`BomExpander`] walks the catalog from one top-level id and returns a
//! fully nested [`BomNode`] whose quantities are absolute. Catalog gaps never
//! fail: missing assemblies and parts become placeholder nodes and a warning
//! is recorded.
//!
//! Re-entry is guarded per root call by the set of assembly ids on the
//! current path. An id already on the path is emitted as a childless
//! placeholder, so a true cycle terminates while the same assembly may still
//! appear in sibling branches.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::core::catalog::CatalogStore;
use crate::entities::{Assembly, AssemblyType};

/// Node type used for missing component references
pub const UNKNOWN_PART_TYPE: &str = "UNKNOWN_PART_TYPE";

/// One node of a generated BOM tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomNode {
    pub id: String,
    pub name: String,
    /// Absolute quantity, already multiplied through every ancestor
    pub quantity: u64,
    pub category: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub children: Vec<BomNode>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub is_placeholder: bool,
}

impl BomNode {
    fn from_assembly(assembly: &Assembly, quantity: u64, category: &str) -> Self {
        Self {
            id: assembly.id.clone(),
            name: assembly.name.clone(),
            quantity,
            category: category.to_string(),
            node_type: assembly.assembly_type.to_string(),
            children: Vec::new(),
            is_custom: false,
            is_placeholder: false,
        }
    }

    /// Placeholder for an assembly id the catalog does not know
    pub fn unknown_assembly(id: &str, quantity: u64, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Unknown Assembly: {}", id),
            quantity,
            category: category.to_string(),
            node_type: AssemblyType::Unknown.to_string(),
            children: Vec::new(),
            is_custom: false,
            is_placeholder: true,
        }
    }

    /// Placeholder for a component id that is neither assembly nor part
    pub fn unknown_part(id: &str, quantity: u64, category: &str) -> Self {
        Self {
            id: format!("UNKNOWN_PART_{}", id),
            name: format!("Unknown Part: {}", id),
            quantity,
            category: category.to_string(),
            node_type: UNKNOWN_PART_TYPE.to_string(),
            children: Vec::new(),
            is_custom: false,
            is_placeholder: true,
        }
    }

    /// Synthesized part number that has no catalog record
    pub fn custom(id: impl Into<String>, name: impl Into<String>, quantity: u64, category: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            category: category.to_string(),
            node_type: AssemblyType::CustomPartAutogen.to_string(),
            children: Vec::new(),
            is_custom: true,
            is_placeholder: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BomNode::node_count).sum::<usize>()
    }

    /// Sum of quantities at leaf nodes of this subtree
    pub fn leaf_quantity(&self) -> u64 {
        if self.is_leaf() {
            self.quantity
        } else {
            self.children.iter().map(BomNode::leaf_quantity).sum()
        }
    }

    /// True if this node or any descendant is a placeholder
    pub fn has_placeholder(&self) -> bool {
        self.is_placeholder || self.children.iter().any(BomNode::has_placeholder)
    }
}

/// Expands top-level ids against a catalog
///
/// One expander is used for a single generation run; it owns no state other
/// than the warnings it has collected.
pub struct BomExpander<'a, C: CatalogStore + ?Sized> {
    catalog: &'a C,
    warnings: Vec<String>,
}

impl<'a, C: CatalogStore + ?Sized> BomExpander<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            warnings: Vec::new(),
        }
    }

    /// Expand `id` at `quantity` under `category`
    ///
    /// Nested nodes inherit `category`. An empty category falls back to the
    /// assembly's own type.
    pub fn expand(&mut self, id: &str, quantity: u64, category: &str) -> BomNode {
        let catalog: &'a C = self.catalog;
        let Some(assembly) = catalog.get_assembly(id) else {
            let category = if category.is_empty() {
                AssemblyType::Unknown.as_str()
            } else {
                category
            };
            self.warn(format!("Assembly {} not found in catalog", id));
            return BomNode::unknown_assembly(id, quantity, category);
        };

        let category = if category.is_empty() {
            assembly.assembly_type.as_str()
        } else {
            category
        };

        let mut path = HashSet::new();
        self.expand_assembly(assembly, quantity, category, &mut path)
    }

    fn expand_assembly(
        &mut self,
        assembly: &'a Assembly,
        quantity: u64,
        category: &str,
        path: &mut HashSet<String>,
    ) -> BomNode {
        let mut node = BomNode::from_assembly(assembly, quantity, category);

        if path.contains(&assembly.id) {
            self.warn(format!(
                "Cyclic reference to {} cut off during expansion",
                assembly.id
            ));
            node.is_placeholder = true;
            return node;
        }

        path.insert(assembly.id.clone());

        let catalog: &'a C = self.catalog;
        for component in &assembly.components {
            if component.quantity == 0 {
                tracing::debug!(
                    assembly = %assembly.id,
                    component = %component.id,
                    "skipping zero-quantity component"
                );
                continue;
            }
            let child_quantity = quantity.saturating_mul(u64::from(component.quantity));

            if let Some(sub) = catalog.get_assembly(&component.id) {
                let child = self.expand_assembly(sub, child_quantity, category, path);
                node.children.push(child);
            } else if let Some(part) = catalog.get_part(&component.id) {
                node.children.push(BomNode {
                    id: part.part_number.clone(),
                    name: part.name.clone(),
                    quantity: child_quantity,
                    category: category.to_string(),
                    node_type: part.part_type.clone(),
                    children: Vec::new(),
                    is_custom: false,
                    is_placeholder: false,
                });
            } else {
                self.warn(format!(
                    "Component {} of assembly {} not found in catalog",
                    component.id, assembly.id
                ));
                node.children
                    .push(BomNode::unknown_part(&component.id, child_quantity, category));
            }
        }

        path.remove(&assembly.id);
        node
    }

    /// Record a degraded-generation condition
    pub fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// Merge top-level nodes that share `(id, category)`
///
/// Output keeps first-seen order. Placeholders are passed through unmerged.
/// Merged subtrees are zipped position by position so child quantities stay
/// absolute.
pub fn consolidate(nodes: Vec<BomNode>) -> Vec<BomNode> {
    let mut out: Vec<BomNode> = Vec::with_capacity(nodes.len());
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for node in nodes {
        if node.is_placeholder {
            out.push(node);
            continue;
        }
        let key = (node.id.clone(), node.category.clone());
        match index.get(&key) {
            Some(&pos) => merge_into(&mut out[pos], node),
            None => {
                index.insert(key, out.len());
                out.push(node);
            }
        }
    }

    out
}

fn merge_into(target: &mut BomNode, incoming: BomNode) {
    target.quantity = target.quantity.saturating_add(incoming.quantity);

    let same_shape = target.children.len() == incoming.children.len()
        && target
            .children
            .iter()
            .zip(&incoming.children)
            .all(|(a, b)| a.id == b.id);

    if same_shape {
        for (child, other) in target.children.iter_mut().zip(incoming.children) {
            merge_into(child, other);
        }
    } else {
        target.children.extend(incoming.children);
    }
}

/// One row of the depth-first flattened BOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    /// Depth, 0 for top-level items
    pub level: usize,
    pub id: String,
    pub name: String,
    pub quantity: u64,
    pub category: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Index of the parent row in the flattened list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    pub is_custom: bool,
    pub is_placeholder: bool,
}

/// Depth-first walk emitting one row per node
pub fn flatten(nodes: &[BomNode]) -> Vec<FlatRow> {
    fn walk(node: &BomNode, level: usize, parent: Option<usize>, rows: &mut Vec<FlatRow>) {
        let own = rows.len();
        rows.push(FlatRow {
            level,
            id: node.id.clone(),
            name: node.name.clone(),
            quantity: node.quantity,
            category: node.category.clone(),
            node_type: node.node_type.clone(),
            parent,
            is_custom: node.is_custom,
            is_placeholder: node.is_placeholder,
        });
        for child in &node.children {
            walk(child, level + 1, Some(own), rows);
        }
    }

    let mut rows = Vec::new();
    for node in nodes {
        walk(node, 0, None, &mut rows);
    }
    rows
}

/// Write flattened rows as CSV
pub fn write_csv<W: Write>(rows: &[FlatRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "level",
        "id",
        "name",
        "quantity",
        "category",
        "type",
        "custom",
        "placeholder",
    ])?;
    for row in rows {
        wtr.write_record([
            row.level.to_string(),
            row.id.clone(),
            row.name.clone(),
            row.quantity.to_string(),
            row.category.clone(),
            row.node_type.clone(),
            row.is_custom.to_string(),
            row.is_placeholder.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generated BOM in both shapes plus the three headline counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomReport {
    pub hierarchical: Vec<BomNode>,
    pub flattened: Vec<FlatRow>,
    /// Nodes in the whole tree
    pub total_items: usize,
    /// Consolidated top-level lines
    pub top_level_items: usize,
    /// Sum of quantities at childless nodes
    pub total_leaf_quantity: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BomReport {
    /// Build the report from an already consolidated top-level list
    pub fn new(hierarchical: Vec<BomNode>, warnings: Vec<String>) -> Self {
        let flattened = flatten(&hierarchical);
        let total_items = flattened.len();
        let top_level_items = hierarchical.len();
        let total_leaf_quantity = hierarchical.iter().map(BomNode::leaf_quantity).sum();
        Self {
            hierarchical,
            flattened,
            total_items,
            top_level_items,
            total_leaf_quantity,
            warnings,
        }
    }

    /// Top-level line for `(id, category)`, if present
    pub fn find(&self, id: &str, category: &str) -> Option<&BomNode> {
        self.hierarchical
            .iter()
            .find(|n| n.id == id && n.category == category)
    }

    pub fn placeholder_count(&self) -> usize {
        self.flattened.iter().filter(|r| r.is_placeholder).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::entities::Part;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_assembly(
            Assembly::new("TOP", "Top kit", AssemblyType::Kit)
                .with_component("SUB", 2)
                .with_component("P-BOLT", 4),
        );
        catalog.insert_assembly(
            Assembly::new("SUB", "Sub assembly", AssemblyType::SubAssembly)
                .with_component("DEEP", 3)
                .with_component("P-NUT", 5),
        );
        catalog.insert_assembly(
            Assembly::new("DEEP", "Deep assembly", AssemblyType::Simple).with_component("P-PIN", 7),
        );
        catalog.insert_part(Part::new("P-BOLT", "100-001", "Bolt"));
        catalog.insert_part(Part::new("P-NUT", "100-002", "Nut"));
        catalog.insert_part(Part::new("P-PIN", "100-003", "Pin"));
        catalog
    }

    #[test]
    fn test_expand_multiplies_through_every_level() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("TOP", 2, "LEGS");

        assert_eq!(node.quantity, 2);
        let sub = &node.children[0];
        assert_eq!(sub.id, "SUB");
        assert_eq!(sub.quantity, 4);
        let deep = &sub.children[0];
        assert_eq!(deep.quantity, 12);
        assert_eq!(deep.children[0].id, "100-003");
        assert_eq!(deep.children[0].quantity, 84);
        assert_eq!(sub.children[1].quantity, 20);
        assert_eq!(node.children[1].id, "100-001");
        assert_eq!(node.children[1].quantity, 8);

        // nested nodes inherit the top-level category
        assert_eq!(deep.children[0].category, "LEGS");
        assert!(expander.warnings().is_empty());
    }

    #[test]
    fn test_expand_preserves_declared_order() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("TOP", 1, "X");
        let ids: Vec<_> = node.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["SUB", "100-001"]);
    }

    #[test]
    fn test_missing_assembly_is_placeholder() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("NOPE", 3, "FEET");

        assert!(node.is_placeholder);
        assert_eq!(node.name, "Unknown Assembly: NOPE");
        assert_eq!(node.node_type, "UNKNOWN");
        assert_eq!(node.quantity, 3);
        assert_eq!(expander.warnings().len(), 1);
    }

    #[test]
    fn test_missing_part_is_placeholder_child() {
        let mut catalog = catalog();
        catalog.insert_assembly(
            Assembly::new("GAP", "Gap kit", AssemblyType::Kit)
                .with_component("P-BOLT", 1)
                .with_component("P-GHOST", 2),
        );
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("GAP", 2, "X");

        assert!(!node.is_placeholder);
        let ghost = &node.children[1];
        assert_eq!(ghost.id, "UNKNOWN_PART_P-GHOST");
        assert_eq!(ghost.name, "Unknown Part: P-GHOST");
        assert_eq!(ghost.node_type, UNKNOWN_PART_TYPE);
        assert_eq!(ghost.quantity, 4);
        assert!(ghost.is_placeholder);
        assert!(node.has_placeholder());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut catalog = Catalog::new();
        catalog.insert_assembly(Assembly::new("A", "A", AssemblyType::Complex).with_component("B", 2));
        catalog.insert_assembly(Assembly::new("B", "B", AssemblyType::SubAssembly).with_component("A", 3));

        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("A", 1, "X");

        let b = &node.children[0];
        assert_eq!(b.quantity, 2);
        let back = &b.children[0];
        assert_eq!(back.id, "A");
        assert_eq!(back.quantity, 6);
        assert!(back.is_placeholder);
        assert!(back.children.is_empty());
        assert_eq!(expander.warnings().len(), 1);
    }

    #[test]
    fn test_same_assembly_in_sibling_branches_expands_twice() {
        let mut catalog = catalog();
        catalog.insert_assembly(
            Assembly::new("PAIR", "Pair", AssemblyType::Kit)
                .with_component("DEEP", 1)
                .with_component("DEEP", 2),
        );
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("PAIR", 1, "X");

        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].children[0].quantity, 7);
        assert_eq!(node.children[1].children[0].quantity, 14);
        assert!(!node.has_placeholder());
    }

    #[test]
    fn test_zero_quantity_component_skipped() {
        let mut catalog = catalog();
        catalog.insert_assembly(
            Assembly::new("Z", "Zero", AssemblyType::Kit)
                .with_component("P-BOLT", 0)
                .with_component("P-NUT", 1),
        );
        let mut expander = BomExpander::new(&catalog);
        let node = expander.expand("Z", 1, "X");
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].id, "100-002");
    }

    #[test]
    fn test_consolidate_sums_and_scales_children() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let a = expander.expand("DEEP", 1, "ACCESSORY");
        let b = expander.expand("DEEP", 2, "ACCESSORY");
        let c = expander.expand("DEEP", 1, "SPARES");

        let merged = consolidate(vec![a, b, c]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 3);
        assert_eq!(merged[0].children[0].quantity, 21);
        assert_eq!(merged[1].category, "SPARES");
        assert_eq!(merged[1].quantity, 1);
    }

    #[test]
    fn test_consolidate_keeps_placeholders_apart() {
        let p1 = BomNode::unknown_assembly("MISSING", 1, "X");
        let p2 = BomNode::unknown_assembly("MISSING", 1, "X");
        let merged = consolidate(vec![p1, p2]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_consolidate_is_idempotent() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let nodes = vec![
            expander.expand("TOP", 1, "A"),
            expander.expand("TOP", 1, "A"),
            expander.expand("DEEP", 1, "B"),
            BomNode::unknown_assembly("GONE", 1, "B"),
            BomNode::unknown_assembly("GONE", 1, "B"),
        ];
        let once = consolidate(nodes);
        let twice = consolidate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flatten_levels_and_parents() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let nodes = vec![expander.expand("TOP", 1, "X"), BomNode::custom("C-1", "Custom", 1, "Y")];
        let rows = flatten(&nodes);

        // TOP, SUB, DEEP, PIN, NUT, BOLT, C-1
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].level, 0);
        assert_eq!(rows[0].parent, None);
        assert_eq!(rows[1].id, "SUB");
        assert_eq!(rows[1].parent, Some(0));
        assert_eq!(rows[3].id, "100-003");
        assert_eq!(rows[3].level, 3);
        assert_eq!(rows[3].parent, Some(2));
        assert_eq!(rows[4].parent, Some(1));
        assert_eq!(rows[5].parent, Some(0));
        assert_eq!(rows[6].parent, None);
        assert!(rows[6].is_custom);
    }

    #[test]
    fn test_report_counts() {
        let catalog = catalog();
        let mut expander = BomExpander::new(&catalog);
        let nodes = vec![expander.expand("TOP", 1, "X"), BomNode::custom("C-1", "Custom", 2, "Y")];
        let report = BomReport::new(nodes, vec![]);

        assert_eq!(report.top_level_items, 2);
        assert_eq!(report.total_items, 7);
        // PIN 42 + NUT 10 + BOLT 4 + custom 2
        assert_eq!(report.total_leaf_quantity, 58);
    }

    #[test]
    fn test_write_csv() {
        let rows = flatten(&[BomNode::custom("720.215.001 T2-ADW-BASIN-26x22x9", "Basin, custom", 1, "BASIN_SIZE")]);
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("level,id,name,quantity,category,type,custom,placeholder")
        );
        assert_eq!(
            lines.next(),
            Some("0,720.215.001 T2-ADW-BASIN-26x22x9,\"Basin, custom\",1,BASIN_SIZE,CUSTOM_PART_AUTOGEN,true,false")
        );
    }
}
