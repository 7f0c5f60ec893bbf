//! JSON-lines event input.
//!
//! One event per line:
//!
//! ```text
//! {"type":"created","tab":{"id":"7","url":"https://example.com"}}
//! {"type":"activated","id":"7"}
//! {"type":"removed","id":"7"}
//! {"type":"restarted"}
//! ```

use crate::error::{CliError, Result};
use crate::provider::TabRecord;
use serde::Deserialize;
use std::io::BufRead;
use tabsweep_domain::ResourceId;
use tabsweep_janitor::{EventSender, HostEvent, TabEvent};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum InputEvent {
    Created { tab: TabRecord },
    Activated { id: String },
    Removed { id: String },
    Restarted,
}

impl From<InputEvent> for HostEvent {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Created { tab } => TabEvent::Created(tab.into()).into(),
            InputEvent::Activated { id } => TabEvent::Activated(ResourceId::new(id)).into(),
            InputEvent::Removed { id } => TabEvent::Removed(ResourceId::new(id)).into(),
            InputEvent::Restarted => HostEvent::Restarted,
        }
    }
}

/// Parse one line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let event: InputEvent = serde_json::from_str(line)
        .map_err(|e| CliError::InvalidInput(format!("bad event '{}': {}", line, e)))?;
    Ok(Some(event.into()))
}

/// Forward every event read from `reader` until EOF.
///
/// Malformed lines are logged and skipped. Stops early if the consumer has
/// gone away. Must run outside the async runtime. Returns the number of
/// events forwarded.
pub fn pump_lines<R: BufRead>(reader: R, sender: &EventSender) -> usize {
    let mut forwarded = 0;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read event input: {}", e);
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(event)) => {
                if sender.blocking_send(event).is_err() {
                    tracing::debug!("Event consumer stopped");
                    break;
                }
                forwarded += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }
    forwarded
}
