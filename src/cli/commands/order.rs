//! `cleanstation order` command - order records and status workflow

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{format_time, open_store, truncate_str};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    suggested_transitions, ActingUser, LogNotifier, OrderStatus, OrderStore, Role, StatusService,
    TransitionRequest,
};
use crate::entities::{HistoryEntry, Order};

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// Create an order in ORDER_CREATED
    New(NewArgs),

    /// List orders
    List,

    /// Show an order
    Show(ShowArgs),

    /// Set or clear the assigned user
    Assign(AssignArgs),

    /// Move an order to a new status
    Status(StatusArgs),

    /// Show an order's status history
    History(ShowArgs),

    /// List the statuses a role may move an order to
    Transitions(TransitionsArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Order id (generated if omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Customer purchase order number
    #[arg(long)]
    pub po: String,

    #[arg(long)]
    pub customer: String,

    /// User id of the creator
    #[arg(long = "created-by")]
    pub created_by: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    pub id: String,

    /// User to assign; omit to clear the assignment
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    pub id: String,

    /// Target status (e.g. READY_FOR_PRE_QC)
    pub status: OrderStatus,

    /// Acting user id
    #[arg(long)]
    pub user: String,

    /// Acting user role
    #[arg(long)]
    pub role: Role,

    #[arg(long)]
    pub notes: Option<String>,

    /// Notify every user instead of order stakeholders only
    #[arg(long)]
    pub notify_all: bool,
}

#[derive(clap::Args, Debug)]
pub struct TransitionsArgs {
    #[arg(long)]
    pub status: OrderStatus,

    #[arg(long)]
    pub role: Role,
}

pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrderCommands::New(args) => run_new(args, global),
        OrderCommands::List => run_list(global),
        OrderCommands::Show(args) => run_show(args, global),
        OrderCommands::Assign(args) => run_assign(args, global),
        OrderCommands::Status(args) => run_status(args, global),
        OrderCommands::History(args) => run_history(args, global),
        OrderCommands::Transitions(args) => run_transitions(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    if args.po.trim().is_empty() {
        return Err(miette::miette!("PO number is required"));
    }
    let config = global.config()?;
    let store = open_store(&config)?;

    let id = args
        .id
        .unwrap_or_else(|| format!("ORD-{}", ulid::Ulid::new()));
    let order = Order::new(id, args.po, args.customer, args.created_by);
    store
        .insert_order(&order)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Created order {}",
        style("✓").green(),
        style(&order.id).cyan()
    );
    println!("   PO {} - {}", style(&order.po_number).yellow(), order.customer_name);
    Ok(())
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "PO")]
    po: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "ASSIGNEE")]
    assignee: String,
    #[tabled(rename = "UPDATED")]
    updated: String,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id.clone(),
            po: o.po_number.clone(),
            customer: truncate_str(&o.customer_name, 30),
            status: o.order_status.to_string(),
            assignee: o.current_assignee.clone().unwrap_or_else(|| "-".to_string()),
            updated: format_time(&o.updated_at),
        }
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let store = open_store(&config)?;
    let orders = store.list_orders().map_err(|e| miette::miette!("{}", e))?;

    let format = effective_format(global.output, true);
    if print_structured(&orders, format)? {
        return Ok(());
    }

    if orders.is_empty() {
        println!("No orders found.");
        println!();
        println!("Create one with: {}", style("cleanstation order new").yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Tsv => {
            for o in &orders {
                println!("{}\t{}\t{}", o.id, o.po_number, o.order_status);
            }
        }
        _ => {
            let rows: Vec<OrderRow> = orders.iter().map(OrderRow::from).collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!("{} order(s) found.", style(orders.len()).cyan());
        }
    }
    Ok(())
}

fn load_order(store: &impl OrderStore, id: &str) -> Result<Order> {
    store
        .get_order(id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("Order not found: {}", id))
}

fn print_order(order: &Order) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&order.id).cyan());
    println!("{}: {}", style("PO").bold(), order.po_number);
    println!("{}: {}", style("Customer").bold(), order.customer_name);
    println!(
        "{}: {} ({})",
        style("Status").bold(),
        style(order.order_status).yellow(),
        order.order_status.label()
    );
    println!("{}: {}", style("Created by").bold(), order.created_by);
    if let Some(assignee) = &order.current_assignee {
        println!("{}: {}", style("Assignee").bold(), assignee);
    }
    println!("{}: {}", style("Created").bold(), format_time(&order.created_at));
    println!("{}: {}", style("Updated").bold(), format_time(&order.updated_at));
    println!("{}", style("─".repeat(60)).dim());
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let store = open_store(&config)?;
    let order = load_order(&store, &args.id)?;

    if !print_structured(&order, global.output)? {
        print_order(&order);
    }
    Ok(())
}

fn run_assign(args: AssignArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let store = open_store(&config)?;
    let order = store
        .set_assignee(&args.id, args.to.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    match &order.current_assignee {
        Some(user) => println!(
            "{} Assigned {} to {}",
            style("✓").green(),
            style(&order.id).cyan(),
            style(user).yellow()
        ),
        None => println!(
            "{} Cleared assignee on {}",
            style("✓").green(),
            style(&order.id).cyan()
        ),
    }
    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let store = open_store(&config)?;
    let service = StatusService::new(store, LogNotifier);

    let user = ActingUser::new(args.user, args.role);
    let mut request = TransitionRequest::new(args.id, args.status).notify_all(args.notify_all);
    if let Some(notes) = args.notes {
        request = request.with_notes(notes);
    }

    let outcome = service
        .transition(&user, &request)
        .map_err(|e| miette::miette!("{}", e))?;

    if !print_structured(&outcome.history, global.output)? {
        println!(
            "{} {} {} {} {}",
            style("✓").green(),
            style(&outcome.order.id).cyan(),
            style(outcome.previous_status).dim(),
            style("→").dim(),
            style(outcome.order.order_status).yellow()
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "WHEN")]
    when: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "FROM")]
    from: String,
    #[tabled(rename = "TO")]
    to: String,
    #[tabled(rename = "NOTES")]
    notes: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(h: &HistoryEntry) -> Self {
        let status = |s: Option<OrderStatus>| s.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        Self {
            when: format_time(&h.timestamp),
            user: h.user_id.clone(),
            action: h.action.clone(),
            from: status(h.old_status),
            to: status(h.new_status),
            notes: truncate_str(&h.notes, 40),
        }
    }
}

fn run_history(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;
    let store = open_store(&config)?;
    // Surface a missing order instead of an empty table
    load_order(&store, &args.id)?;
    let history = store
        .history(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    let format = effective_format(global.output, true);
    if print_structured(&history, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Tsv => {
            for h in &history {
                println!(
                    "{}\t{}\t{}\t{}",
                    h.timestamp.to_rfc3339(),
                    h.user_id,
                    h.action,
                    h.new_status.map(|s| s.to_string()).unwrap_or_default()
                );
            }
        }
        _ => {
            let rows: Vec<HistoryRow> = history.iter().map(HistoryRow::from).collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
        }
    }
    Ok(())
}

fn run_transitions(args: TransitionsArgs, global: &GlobalOpts) -> Result<()> {
    let targets = suggested_transitions(args.status, args.role);
    let format = effective_format(global.output, true);
    if print_structured(&targets, format)? {
        return Ok(());
    }

    if targets.is_empty() {
        println!(
            "{} cannot move an order out of {}",
            style(args.role).yellow(),
            style(args.status).cyan()
        );
        return Ok(());
    }
    for target in targets {
        println!("{}\t{}", target, target.label());
    }
    Ok(())
}
