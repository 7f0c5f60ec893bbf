//! Run command implementation.

use crate::error::Result;
use crate::input::pump_lines;
use crate::AppService;
use tabsweep_janitor::{event_channel, JanitorWorker, SharedBadge, TokioScheduler};

const EVENT_BUFFER: usize = 256;

/// Execute the run command.
///
/// Events are read from stdin on a plain thread; the async side consumes
/// them in order until Ctrl+C.
pub async fn execute_run(service: AppService, badge: SharedBadge) -> Result<()> {
    let scheduler = TokioScheduler::current()?;
    let (sender, events) = event_channel(EVENT_BUFFER);

    std::thread::Builder::new()
        .name("tabsweep-stdin".to_string())
        .spawn(move || {
            let forwarded = pump_lines(std::io::stdin().lock(), &sender);
            tracing::info!("Event input closed after {} event(s)", forwarded);
        })?;

    let worker = JanitorWorker::new(service, Some(badge));
    worker.run(&scheduler, events).await?;
    Ok(())
}
