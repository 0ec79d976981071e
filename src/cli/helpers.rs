//! Shared helper functions for CLI commands

use chrono::{DateTime, Utc};
use miette::Result;

use crate::core::{Catalog, Config, SqliteOrderStore};

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Short local-independent timestamp for tables
pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Load the catalog named by the resolved configuration
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    let dir = config.catalog_dir();
    let catalog = Catalog::load(&dir).map_err(|e| miette::miette!("{}", e))?;
    tracing::debug!(
        dir = %dir.display(),
        assemblies = catalog.assembly_count(),
        parts = catalog.part_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Open the order database named by the resolved configuration
pub fn open_store(config: &Config) -> Result<SqliteOrderStore> {
    SqliteOrderStore::open(&config.database()).map_err(|e| miette::miette!("{}", e))
}
