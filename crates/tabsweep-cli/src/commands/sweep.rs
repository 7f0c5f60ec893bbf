//! Sweep command implementation.

use crate::error::Result;
use crate::output::Formatter;
use crate::AppService;
use tabsweep_janitor::{ReconcileReport, SweepOutcome};

/// Execute the sweep command.
///
/// A dry run skips reconciliation so that nothing is written.
pub fn execute_sweep(service: &AppService, formatter: &Formatter) -> Result<()> {
    let reconciled = if service.config().dry_run {
        ReconcileReport::default()
    } else {
        service.reconcile()?
    };

    match service.sweep()? {
        SweepOutcome::Completed(report) => {
            println!("{}", formatter.format_sweep(&reconciled, &report)?);
        }
        SweepOutcome::Skipped => {
            println!("{}", formatter.warning("Another sweep is in progress"));
        }
    }
    Ok(())
}
