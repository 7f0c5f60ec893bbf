//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabsweep - Close tabs that have sat idle too long.
#[derive(Debug, Parser)]
#[command(name = "tabsweep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TABSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Track tabs from JSON-lines events on stdin and sweep periodically
    Run,

    /// Reconcile, then run a single sweep
    Sweep(SweepArgs),

    /// Show every live tab with its idle time and time left
    Status,

    /// Change the idle time after which tabs are closed
    SetTtl(SetTtlArgs),
}

/// Arguments for the sweep command.
#[derive(Debug, Parser)]
pub struct SweepArgs {
    /// Report what would be closed without closing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the set-ttl command.
#[derive(Debug, Parser)]
pub struct SetTtlArgs {
    /// Maximum idle time in days (fractions allowed, e.g. 0.5)
    pub days: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_command() {
        let cli = Cli::parse_from(["tabsweep", "sweep", "--dry-run"]);
        match cli.command {
            Command::Sweep(args) => assert!(args.dry_run),
            _ => panic!("Expected Sweep command"),
        }
    }

    #[test]
    fn test_set_ttl_keeps_raw_input() {
        let cli = Cli::parse_from(["tabsweep", "set-ttl", "abc"]);
        match cli.command {
            Command::SetTtl(args) => assert_eq!(args.days, "abc"),
            _ => panic!("Expected SetTtl command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "tabsweep",
            "status",
            "--format",
            "json",
            "--config",
            "/tmp/tabsweep.toml",
        ]);
        assert!(matches!(cli.command, Command::Status));
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tabsweep.toml")));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["tabsweep"]).is_err());
    }
}
