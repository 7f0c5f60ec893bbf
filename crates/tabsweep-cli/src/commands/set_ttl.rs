//! Set-ttl command implementation.

use crate::cli::SetTtlArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::AppService;

/// Execute the set-ttl command.
pub fn execute_set_ttl(args: &SetTtlArgs, service: &AppService, formatter: &Formatter) -> Result<()> {
    let settings = service.set_max_age_days(&args.days)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Tabs idle for {} day(s) will be closed",
            settings.max_age_days()
        ))
    );
    Ok(())
}
