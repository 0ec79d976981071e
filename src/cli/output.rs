//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::BomNode;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Tree
            }
        }
        other => other,
    }
}

/// Print `value` as JSON or YAML; returns false for any other format
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print collected warnings to stderr
pub fn print_warnings(warnings: &[String], quiet: bool) {
    if quiet {
        return;
    }
    for w in warnings {
        eprintln!("{} {}", style("!").yellow(), w);
    }
}

/// Render a BOM forest as an indented tree, one node per line
pub fn render_tree(nodes: &[BomNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_line(&mut out, "", node);
        push_children(&mut out, "", &node.children);
    }
    out
}

fn push_children(out: &mut String, prefix: &str, children: &[BomNode]) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        push_line(out, &format!("{}{}", prefix, branch), child);
        let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
        push_children(out, &next, &child.children);
    }
}

fn push_line(out: &mut String, prefix: &str, node: &BomNode) {
    let mut marker = String::new();
    if node.is_custom {
        marker.push_str(" (custom)");
    }
    if node.is_placeholder {
        marker.push_str(" (placeholder)");
    }
    out.push_str(&format!(
        "{}{} x {}  {}  [{}]{}\n",
        prefix, node.quantity, node.id, node.name, node.category, marker
    ));
}
