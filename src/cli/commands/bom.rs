//! `cleanstation bom` command - BOM generation from an order configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{load_catalog, truncate_str};
use crate::cli::output::{effective_format, print_structured, print_warnings, render_tree};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::bom::write_csv;
use crate::core::{generate_bom, BomReport, Config, FlatRow};
use crate::schema::{OrderValidator, ValidationError};

#[derive(Subcommand, Debug)]
pub enum BomCommands {
    /// Generate the consolidated BOM for an order configuration (JSON)
    Generate(GenerateArgs),

    /// Validate an order configuration without generating
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Path to the order configuration JSON ("-" for stdin)
    pub order: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Path to the order configuration JSON ("-" for stdin)
    pub order: PathBuf,
}

pub fn run(cmd: BomCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BomCommands::Generate(args) => run_generate(args, global),
        BomCommands::Validate(args) => run_validate(args, global),
    }
}

fn read_payload(path: &Path, config: &Config) -> Result<serde_json::Value> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).into_diagnostic()?
    } else {
        fs::read_to_string(path)
            .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))?
    };
    let mut value: serde_json::Value =
        serde_json::from_str(&text).map_err(ValidationError::Syntax)?;

    if let Some(language) = config.default_language {
        if let Some(customer) = value.get_mut("customer").and_then(|c| c.as_object_mut()) {
            customer
                .entry("language")
                .or_insert_with(|| serde_json::Value::String(language.to_string()));
        }
    }
    Ok(value)
}

fn report_field_errors(err: &ValidationError) {
    for field in err.field_errors() {
        eprintln!("  {} {}", style("✗").red(), field);
    }
}

fn run_validate(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let value = read_payload(&args.order, &config)?;
    let validator = OrderValidator::new()?;

    match validator.validate(&value) {
        Ok(order) => {
            println!(
                "{} {} is valid ({} build(s))",
                style("✓").green(),
                style(args.order.display()).cyan(),
                order.build_numbers.len()
            );
            Ok(())
        }
        Err(e) => {
            report_field_errors(&e);
            Err(e.into())
        }
    }
}

fn run_generate(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let value = read_payload(&args.order, &config)?;
    let validator = OrderValidator::new()?;
    let order = validator.validate(&value).map_err(|e| {
        report_field_errors(&e);
        miette::Report::new(e)
    })?;

    let catalog = load_catalog(&config)?;
    let report = generate_bom(&catalog, &order);
    print_warnings(&report.warnings, global.quiet);

    let format = effective_format(global.output, false);
    if print_structured(&report, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv => {
            write_csv(&report.flattened, std::io::stdout()).into_diagnostic()?;
        }
        OutputFormat::Tsv => {
            println!("level\tid\tname\tquantity\tcategory\ttype");
            for row in &report.flattened {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    row.level, row.id, row.name, row.quantity, row.category, row.node_type
                );
            }
        }
        OutputFormat::Table => {
            let rows: Vec<BomTableRow> = report.flattened.iter().map(BomTableRow::from).collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            print_summary(&report, &order.customer.po_number);
        }
        _ => {
            println!(
                "{} BOM for PO {} - {}",
                style("Order").bold(),
                style(&order.customer.po_number).yellow(),
                style(&order.customer.customer_name).white()
            );
            println!();
            print!("{}", render_tree(&report.hierarchical));
            print_summary(&report, &order.customer.po_number);
        }
    }
    Ok(())
}

fn print_summary(report: &BomReport, po_number: &str) {
    println!();
    println!(
        "{} top-level item(s), {} node(s), {} leaf unit(s) for {}",
        style(report.top_level_items).cyan(),
        style(report.total_items).cyan(),
        style(report.total_leaf_quantity).cyan(),
        po_number
    );
    let placeholders = report.placeholder_count();
    if placeholders > 0 {
        println!(
            "{} {} placeholder(s) - catalog is missing entries",
            style("!").yellow(),
            placeholders
        );
    }
}

#[derive(Tabled)]
struct BomTableRow {
    #[tabled(rename = "LVL")]
    level: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "QTY")]
    quantity: u64,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "TYPE")]
    node_type: String,
}

impl From<&FlatRow> for BomTableRow {
    fn from(row: &FlatRow) -> Self {
        Self {
            level: row.level,
            id: format!("{}{}", "  ".repeat(row.level), row.id),
            name: truncate_str(&row.name, 40),
            quantity: row.quantity,
            category: row.category.clone(),
            node_type: row.node_type.clone(),
        }
    }
}
