//! tabsweep - close tabs that have sat idle too long.

use clap::Parser;
use std::sync::Arc;
use tabsweep_cli::commands;
use tabsweep_cli::config::OutputFormat;
use tabsweep_cli::{build_service, Cli, Command, Config, Formatter, TerminalBadge};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let color_enabled = !cli.no_color;

    if let Err(e) = run(cli).await {
        let formatter = Formatter::new(OutputFormat::Table, color_enabled);
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> tabsweep_cli::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    if let Command::Sweep(args) = &cli.command {
        config.janitor.dry_run |= args.dry_run;
    }
    let service = build_service(&config)?;

    match cli.command {
        Command::Run => {
            let badge = Arc::new(TerminalBadge::new(color_enabled));
            commands::execute_run(service, badge).await?;
        }
        Command::Sweep(_) => commands::execute_sweep(&service, &formatter)?,
        Command::Status => commands::execute_status(&service, &formatter)?,
        Command::SetTtl(args) => commands::execute_set_ttl(&args, &service, &formatter)?,
    }

    Ok(())
}
