//! `cleanstation catalog` command - catalog inspection

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{load_catalog, truncate_str};
use crate::cli::output::{effective_format, print_structured, render_tree};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{BomExpander, CatalogStore};

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List catalog assemblies
    List,

    /// Show an assembly expanded to its parts, or a single part
    Show(ShowArgs),

    /// Report dangling references, zero quantities and cycles
    Check,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Assembly or part id
    pub id: String,

    /// Quantity to expand for
    #[arg(long, short = 'n', default_value_t = 1)]
    pub quantity: u64,
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::List => run_list(global),
        CatalogCommands::Show(args) => run_show(args, global),
        CatalogCommands::Check => run_check(global),
    }
}

#[derive(Tabled, serde::Serialize)]
struct AssemblyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    #[serde(rename = "type")]
    assembly_type: String,
    #[tabled(rename = "COMPONENTS")]
    components: usize,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let catalog = load_catalog(&config)?;
    let rows: Vec<AssemblyRow> = catalog
        .assemblies()
        .into_iter()
        .map(|a| AssemblyRow {
            id: a.id.clone(),
            name: truncate_str(&a.name, 48),
            assembly_type: a.assembly_type.to_string(),
            components: a.components.len(),
        })
        .collect();

    let format = effective_format(global.output, true);
    if print_structured(&rows, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if format == OutputFormat::Tsv { "\t" } else { "," };
            for row in &rows {
                println!("{}{}{}", row.id, sep, row.assembly_type);
            }
        }
        _ => {
            println!("{}", Table::new(&rows).with(Style::sharp()));
            println!(
                "{} assemblies, {} parts",
                style(catalog.assembly_count()).cyan(),
                style(catalog.part_count()).cyan()
            );
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let catalog = load_catalog(&config)?;
    let format = effective_format(global.output, false);

    if catalog.get_assembly(&args.id).is_none() {
        let part = catalog
            .get_part(&args.id)
            .ok_or_else(|| miette::miette!("No assembly or part with id '{}'", args.id))?;
        if !print_structured(part, format)? {
            println!("{}: {}", style("Part").bold(), style(&part.id).cyan());
            println!("{}: {}", style("Part number").bold(), part.part_number);
            println!("{}: {}", style("Name").bold(), part.name);
            println!("{}: {}", style("Type").bold(), part.part_type);
        }
        return Ok(());
    }

    let mut expander = BomExpander::new(&catalog);
    let node = expander.expand(&args.id, args.quantity, "");
    for w in expander.warnings() {
        if !global.quiet {
            eprintln!("{} {}", style("!").yellow(), w);
        }
    }
    if !print_structured(&node, format)? {
        print!("{}", render_tree(std::slice::from_ref(&node)));
    }
    Ok(())
}

fn run_check(global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let catalog = load_catalog(&config)?;
    let issues = catalog.check();

    if issues.is_empty() {
        println!(
            "{} Catalog OK ({} assemblies, {} parts)",
            style("✓").green(),
            catalog.assembly_count(),
            catalog.part_count()
        );
        return Ok(());
    }

    for issue in &issues {
        println!("{} {}", style("✗").red(), issue);
    }
    Err(miette::miette!("{} catalog issue(s) found", issues.len()))
}
