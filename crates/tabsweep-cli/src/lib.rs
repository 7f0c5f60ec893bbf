//! tabsweep CLI library.
//!
//! This library provides the host shim for the tabsweep janitor: a
//! file-backed tab provider, a terminal badge, JSON-lines event input,
//! configuration management and output formatting.

pub mod badge;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod provider;
pub mod store;

pub use badge::TerminalBadge;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use provider::{FileTabProvider, TabRecord};
pub use store::AppStore;

use tabsweep_janitor::TabService;

/// Service type used by every command.
pub type AppService = TabService<AppStore, FileTabProvider>;

/// Open the configured store and tabs file.
pub fn build_service(config: &Config) -> Result<AppService> {
    let store = AppStore::open(&config.database)?;
    let provider = FileTabProvider::new(&config.tabs_file);
    Ok(TabService::new(store, provider, config.janitor.clone()))
}
