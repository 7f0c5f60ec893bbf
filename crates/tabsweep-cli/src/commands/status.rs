//! Status command implementation.

use crate::error::Result;
use crate::output::Formatter;
use crate::AppService;

/// Execute the status command.
pub fn execute_status(service: &AppService, formatter: &Formatter) -> Result<()> {
    let statuses = service.status()?;
    let at_risk = service.at_risk_count()?;
    let settings = service.settings()?;

    println!("{}", formatter.format_status(&statuses, at_risk, &settings)?);
    Ok(())
}
