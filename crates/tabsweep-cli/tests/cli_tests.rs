//! Integration tests for the tabsweep CLI
//!
//! Exercise the commands against a real tabs file and a JSON store in a
//! temporary directory.

use std::fs;
use tabsweep_cli::commands;
use tabsweep_cli::config::OutputFormat;
use tabsweep_cli::{build_service, CliError, Config, FileTabProvider, Formatter};
use tabsweep_store::JsonFileStore;
use tempfile::TempDir;

const DAY: u64 = 86_400_000;

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Tabs 1 (stale), 2 (fresh) and 3 (stale but pinned)
fn setup() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.database = dir.path().join("state.json");
    config.tabs_file = dir.path().join("tabs.json");

    fs::write(
        &config.tabs_file,
        r#"[
            {"id": "1", "url": "https://old.test"},
            {"id": "2", "url": "https://new.test"},
            {"id": "3", "url": "https://pinned.test", "pinned": true}
        ]"#,
    )
    .unwrap();

    let now = now_millis();
    fs::write(
        &config.database,
        format!(
            r#"{{"tabTimestamps": {{"1": {}, "2": {}, "3": {}, "gone": {}}}, "settings": {{"maxAgeDays": 7}}}}"#,
            now - 10 * DAY,
            now,
            now - 30 * DAY,
            now - DAY
        ),
    )
    .unwrap();

    (dir, config)
}

fn formatter() -> Formatter {
    Formatter::new(OutputFormat::Table, false)
}

fn live_ids(config: &Config) -> Vec<String> {
    FileTabProvider::new(&config.tabs_file)
        .records()
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect()
}

fn stored_ids(config: &Config) -> Vec<String> {
    let state = JsonFileStore::new(&config.database).read_state().unwrap();
    state.tab_timestamps.into_keys().collect()
}

#[test]
fn test_sweep_closes_stale_tabs() {
    let (_dir, config) = setup();
    let service = build_service(&config).unwrap();

    commands::execute_sweep(&service, &formatter()).unwrap();

    assert_eq!(live_ids(&config), vec!["2", "3"]);
    assert_eq!(stored_ids(&config), vec!["2", "3"]);
}

#[test]
fn test_dry_run_changes_nothing() {
    let (_dir, mut config) = setup();
    config.janitor.dry_run = true;
    let before = fs::read_to_string(&config.database).unwrap();
    let service = build_service(&config).unwrap();

    commands::execute_sweep(&service, &formatter()).unwrap();

    assert_eq!(live_ids(&config), vec!["1", "2", "3"]);
    assert_eq!(fs::read_to_string(&config.database).unwrap(), before);
}

#[test]
fn test_set_ttl_validates_and_persists() {
    let (_dir, config) = setup();
    let service = build_service(&config).unwrap();

    let result = commands::execute_set_ttl(
        &tabsweep_cli::cli::SetTtlArgs { days: "-1".to_string() },
        &service,
        &formatter(),
    );
    assert!(matches!(result, Err(CliError::Janitor(_))));

    commands::execute_set_ttl(
        &tabsweep_cli::cli::SetTtlArgs { days: "14".to_string() },
        &service,
        &formatter(),
    )
    .unwrap();

    let state = JsonFileStore::new(&config.database).read_state().unwrap();
    assert_eq!(state.settings.max_age_days, Some(14.0));

    // 10 days idle is now within the TTL
    commands::execute_sweep(&service, &formatter()).unwrap();
    assert_eq!(live_ids(&config), vec!["1", "2", "3"]);
}

#[test]
fn test_status_reports_at_risk() {
    let (_dir, config) = setup();
    let service = build_service(&config).unwrap();

    commands::execute_status(&service, &formatter()).unwrap();
    assert_eq!(service.at_risk_count().unwrap(), 0);

    let statuses = service.status().unwrap();
    assert_eq!(statuses.len(), 3);
    assert!(statuses.iter().any(|s| s.resource.id.as_str() == "3" && s.protected));
}

#[test]
fn test_sqlite_backend() {
    let (dir, mut config) = setup();
    config.database = dir.path().join("tabsweep.db");
    let service = build_service(&config).unwrap();

    // Fresh database: reconcile stamps every tab with "now", nothing expires
    commands::execute_sweep(&service, &formatter()).unwrap();
    assert_eq!(live_ids(&config), vec!["1", "2", "3"]);
    assert!(dir.path().join("tabsweep.db").exists());
}
