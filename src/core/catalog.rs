//! Catalog store - read-only lookup of assemblies and parts
//!
//! The catalog is owned outside this crate. [`CatalogStore`] is the seam the
//! BOM engine reads through; [`Catalog`] is the in-memory implementation
//! loaded from a directory of YAML bundle files:
//!
//! ```yaml
//! assemblies:
//!   - id: T2-DL27-KIT
//!     name: DL27 LEG KIT
//!     type: KIT
//!     components:
//!       - id: T2-DL27-LEG
//!         quantity: 4
//! parts:
//!   - id: T2-DL27-LEG
//!     part_number: 711.97-01
//!     name: DL27 LEG
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::entities::{Assembly, Part};
use crate::yaml::{parse_yaml, parse_yaml_file, YamlError};

/// Read-only catalog access used during BOM expansion
pub trait CatalogStore: Send + Sync {
    fn get_assembly(&self, id: &str) -> Option<&Assembly>;

    fn get_part(&self, id: &str) -> Option<&Part>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Duplicate catalog id '{id}' in {first} and {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("Failed to walk catalog directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// On-disk file layout: either list may be omitted
#[derive(Debug, Default, Deserialize)]
struct CatalogBundle {
    #[serde(default)]
    assemblies: Vec<Assembly>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// In-memory catalog
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    assemblies: HashMap<String, Assembly>,
    parts: HashMap<String, Part>,
    /// id -> source the record was loaded from, for duplicate reporting
    sources: HashMap<String, String>,
}

/// Integrity problem found by [`Catalog::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// Component id resolves to neither an assembly nor a part
    DanglingReference { assembly: String, component: String },
    /// Component declared with quantity 0
    ZeroQuantity { assembly: String, component: String },
    /// Assembly reachable from itself through its components
    Cycle { path: Vec<String> },
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogIssue::DanglingReference {
                assembly,
                component,
            } => write!(f, "{} references unknown id {}", assembly, component),
            CatalogIssue::ZeroQuantity {
                assembly,
                component,
            } => write!(f, "{} lists {} with quantity 0", assembly, component),
            CatalogIssue::Cycle { path } => write!(f, "cycle: {}", path.join(" -> ")),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.yaml`/`.yml` file under `dir`
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::NotFound(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|e| e == "yaml" || e == "yml")
            {
                files.push(path.to_path_buf());
            }
        }
        // Deterministic duplicate reporting regardless of directory order
        files.sort();

        let mut catalog = Catalog::new();
        for path in files {
            let bundle: CatalogBundle = parse_yaml_file(&path)?;
            catalog.merge_bundle(bundle, &path.display().to_string())?;
        }

        tracing::debug!(
            assemblies = catalog.assemblies.len(),
            parts = catalog.parts.len(),
            dir = %dir.display(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a single YAML bundle
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let bundle: CatalogBundle = parse_yaml(content, "<inline>")?;
        let mut catalog = Catalog::new();
        catalog.merge_bundle(bundle, "<inline>")?;
        Ok(catalog)
    }

    fn merge_bundle(&mut self, bundle: CatalogBundle, source: &str) -> Result<(), CatalogError> {
        for assembly in bundle.assemblies {
            self.claim_id(&assembly.id, source)?;
            self.assemblies.insert(assembly.id.clone(), assembly);
        }
        for part in bundle.parts {
            self.claim_id(&part.id, source)?;
            self.parts.insert(part.id.clone(), part);
        }
        Ok(())
    }

    fn claim_id(&mut self, id: &str, source: &str) -> Result<(), CatalogError> {
        if let Some(first) = self.sources.get(id) {
            return Err(CatalogError::DuplicateId {
                id: id.to_string(),
                first: first.clone(),
                second: source.to_string(),
            });
        }
        self.sources.insert(id.to_string(), source.to_string());
        Ok(())
    }

    /// Add an assembly, replacing any previous record with the same id
    pub fn insert_assembly(&mut self, assembly: Assembly) {
        self.sources
            .insert(assembly.id.clone(), "<memory>".to_string());
        self.assemblies.insert(assembly.id.clone(), assembly);
    }

    /// Add a part, replacing any previous record with the same id
    pub fn insert_part(&mut self, part: Part) {
        self.sources.insert(part.id.clone(), "<memory>".to_string());
        self.parts.insert(part.id.clone(), part);
    }

    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Assemblies sorted by id
    pub fn assemblies(&self) -> Vec<&Assembly> {
        let mut list: Vec<&Assembly> = self.assemblies.values().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    /// Report dangling references, zero quantities and cycles
    pub fn check(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for assembly in self.assemblies() {
            for component in &assembly.components {
                if !self.assemblies.contains_key(&component.id)
                    && !self.parts.contains_key(&component.id)
                {
                    issues.push(CatalogIssue::DanglingReference {
                        assembly: assembly.id.clone(),
                        component: component.id.clone(),
                    });
                }
                if component.quantity == 0 {
                    issues.push(CatalogIssue::ZeroQuantity {
                        assembly: assembly.id.clone(),
                        component: component.id.clone(),
                    });
                }
            }
        }

        let mut reported: Vec<Vec<String>> = Vec::new();
        for assembly in self.assemblies() {
            let mut path = vec![assembly.id.clone()];
            self.find_cycles(assembly, &mut path, &mut reported);
        }
        issues.extend(reported.into_iter().map(|path| CatalogIssue::Cycle { path }));

        issues
    }

    fn find_cycles(&self, assembly: &Assembly, path: &mut Vec<String>, found: &mut Vec<Vec<String>>) {
        for component in &assembly.components {
            let Some(child) = self.assemblies.get(&component.id) else {
                continue;
            };
            if let Some(pos) = path.iter().position(|id| id == &child.id) {
                let mut cycle: Vec<String> = path[pos..].to_vec();
                cycle.push(child.id.clone());
                // Each cycle is reported once, from its smallest member
                let min = cycle.iter().take(cycle.len() - 1).min().cloned();
                if min.as_deref() == Some(cycle[0].as_str()) && !found.contains(&cycle) {
                    found.push(cycle);
                }
                continue;
            }
            path.push(child.id.clone());
            self.find_cycles(child, path, found);
            path.pop();
        }
    }
}

impl CatalogStore for Catalog {
    fn get_assembly(&self, id: &str) -> Option<&Assembly> {
        self.assemblies.get(id)
    }

    fn get_part(&self, id: &str) -> Option<&Part> {
        self.parts.get(id)
    }
}
