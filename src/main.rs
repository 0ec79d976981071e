use clap::Parser;
use miette::Result;
use cleanstation::cli::{Cli, Commands};
use cleanstation::core::Config;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // A broken config file is reported by the command itself
    let level = Config::load()
        .ok()
        .and_then(|c| c.log_level)
        .unwrap_or_else(|| "warn".to_string());
    cleanstation::logging::init(&level);

    match cli.command {
        Commands::Bom(cmd) => cleanstation::cli::commands::bom::run(cmd, &cli.global),
        Commands::Catalog(cmd) => cleanstation::cli::commands::catalog::run(cmd, &cli.global),
        Commands::Order(cmd) => cleanstation::cli::commands::order::run(cmd, &cli.global),
    }
}
