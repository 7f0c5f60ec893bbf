//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use std::time::Duration;
use tabsweep_domain::Settings;
use tabsweep_janitor::{ReconcileReport, SweepReport, TabStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the status listing.
    pub fn format_status(
        &self,
        statuses: &[TabStatus],
        at_risk: usize,
        settings: &Settings,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_status_json(statuses, at_risk, settings),
            OutputFormat::Table => Ok(self.format_status_table(statuses, at_risk, settings)),
        }
    }

    fn format_status_json(
        &self,
        statuses: &[TabStatus],
        at_risk: usize,
        settings: &Settings,
    ) -> Result<String> {
        let tabs: Vec<serde_json::Value> = statuses
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.resource.id.as_str(),
                    "url": s.resource.identity_key.as_str(),
                    "title": s.resource.title,
                    "pinned": s.resource.pinned,
                    "active": s.resource.active,
                    "protected": s.protected,
                    "lastActive": s.last_active,
                    "idleMs": s.idle.map(|d| d.as_millis() as u64),
                    "remainingMs": s.remaining.map(|d| d.as_millis() as u64),
                })
            })
            .collect();

        let doc = serde_json::json!({
            "maxAgeDays": settings.max_age_days(),
            "atRisk": at_risk,
            "tabs": tabs,
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn format_status_table(
        &self,
        statuses: &[TabStatus],
        at_risk: usize,
        settings: &Settings,
    ) -> String {
        let header = format!(
            "Max age: {} day(s), {} tab(s) at risk",
            settings.max_age_days(),
            at_risk
        );
        if statuses.is_empty() {
            return format!("{}\n{}", header, self.colorize("No open tabs.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "URL", "Idle", "Remaining", "State"]);

        for status in statuses {
            let idle = status.idle.map(format_duration).unwrap_or_else(|| "-".to_string());
            let remaining = status
                .remaining
                .map(format_duration)
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                status.resource.id.as_str(),
                &truncate(&status.resource.title, 30),
                &truncate(status.resource.identity_key.as_str(), 40),
                &idle,
                &remaining,
                &self.state_label(status),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", header, table)
    }

    fn state_label(&self, status: &TabStatus) -> String {
        if status.resource.pinned {
            self.colorize("pinned", "cyan")
        } else if status.resource.active {
            self.colorize("active", "green")
        } else if status.protected {
            self.colorize("sibling", "blue")
        } else if status.last_active.is_none() {
            self.colorize("untracked", "magenta")
        } else if status.remaining == Some(Duration::ZERO) {
            self.colorize("expired", "red")
        } else {
            String::new()
        }
    }

    /// Format a sweep report.
    pub fn format_sweep(&self, reconciled: &ReconcileReport, report: &SweepReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            let doc = serde_json::json!({
                "reconciled": { "added": reconciled.added, "removed": reconciled.removed },
                "evicted": report.evicted.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "protected": report.protected,
                "untracked": report.untracked,
                "orphansPurged": report.orphans_purged,
                "removalFailures": report.removal_failures,
                "dryRun": report.dry_run,
            });
            return Ok(serde_json::to_string_pretty(&doc)?);
        }

        let mut lines = Vec::new();
        if reconciled.changed() {
            lines.push(self.info(&format!(
                "Reconciled: {} added, {} removed",
                reconciled.added, reconciled.removed
            )));
        }

        let verb = if report.dry_run { "Would close" } else { "Closed" };
        lines.push(self.success(&format!("{} {} tab(s)", verb, report.evicted.len())));
        for id in &report.evicted {
            lines.push(format!("  - {}", id));
        }
        if report.protected > 0 {
            lines.push(self.info(&format!("{} protected tab(s) skipped", report.protected)));
        }
        if report.orphans_purged > 0 {
            lines.push(self.info(&format!("{} orphaned entr(ies) purged", report.orphans_purged)));
        }
        if report.removal_failures > 0 {
            lines.push(self.warning(&format!(
                "{} tab(s) could not be closed",
                report.removal_failures
            )));
        }
        Ok(lines.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Compact human duration: `6d 23h`, `4h 05m`, `59m`, `<1m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let (days, hours, minutes) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        "<1m".to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
