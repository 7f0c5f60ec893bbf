//! Terminal badge: prints the at-risk count when it changes.

use colored::*;
use std::sync::{Mutex, PoisonError};
use tabsweep_domain::traits::{BadgeColor, BadgeSink};

/// Writes badge changes to stderr.
#[derive(Debug, Default)]
pub struct TerminalBadge {
    color_enabled: bool,
    current: Mutex<Option<String>>,
}

impl TerminalBadge {
    /// Create a badge.
    pub fn new(color_enabled: bool) -> Self {
        Self {
            color_enabled,
            current: Mutex::new(None),
        }
    }

    /// Label currently shown, if any.
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Line printed for a label.
    pub fn render(&self, text: &str, color: BadgeColor) -> String {
        let label = format!(" {} ", text);
        let label = if self.color_enabled {
            label
                .as_str()
                .bold()
                .white()
                .on_truecolor(color.r, color.g, color.b)
                .to_string()
        } else {
            format!("[{}]", text)
        };
        format!("{} tab(s) will be closed within the warning window", label)
    }

    /// Swap in a new label; returns whether it changed.
    fn replace(&self, label: Option<&str>) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_deref() == label {
            return false;
        }
        *current = label.map(str::to_string);
        true
    }
}

impl BadgeSink for TerminalBadge {
    fn set_label(&self, text: &str, color: BadgeColor) {
        if self.replace(Some(text)) {
            eprintln!("{}", self.render(text, color));
        }
    }

    fn clear(&self) {
        if self.replace(None) {
            eprintln!("No tabs close to expiry");
        }
    }
}
