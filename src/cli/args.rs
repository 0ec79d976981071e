//! Top-level argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::{bom::BomCommands, catalog::CatalogCommands, order::OrderCommands};
use crate::core::Config;

#[derive(Parser, Debug)]
#[command(name = "cleanstation")]
#[command(version, about = "CleanStation sink configurator: BOM generation and order workflow")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Catalog directory (overrides config and CLEANSTATION_CATALOG)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Order database (overrides config and CLEANSTATION_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Suppress warnings on stderr
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Resolve configuration with command-line flags as the last layer
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load().map_err(|e| miette::miette!("{}", e))?;
        config.merge(Config {
            catalog_dir: self.catalog.clone(),
            database: self.db.clone(),
            ..Default::default()
        });
        Ok(config)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pick per command (tree for BOMs, table for lists)
    #[default]
    Auto,
    Json,
    Yaml,
    Tree,
    Tsv,
    Csv,
    Table,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate bills of materials
    #[command(subcommand)]
    Bom(BomCommands),

    /// Inspect the assembly catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Create orders and move them through the workflow
    #[command(subcommand)]
    Order(OrderCommands),
}
