//! Settings module - the idle TTL

use std::fmt;
use std::time::Duration;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rejected TTL input
///
/// Raised at the settings boundary; the previously stored value stays in
/// effect.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidTtl {
    /// Input was not a number
    NotANumber(String),

    /// Number was zero, negative, not finite or shorter than a millisecond
    NotPositive(f64),
}

impl fmt::Display for InvalidTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidTtl::NotANumber(input) => write!(f, "'{}' is not a number of days", input),
            InvalidTtl::NotPositive(days) => {
                write!(f, "max age must be a positive number of days, got {}", days)
            }
        }
    }
}

impl std::error::Error for InvalidTtl {}

/// Persisted settings record
///
/// Holds the TTL in (possibly fractional) days. The value is validated on
/// construction, so a `Settings` always carries a finite TTL of at least
/// one millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    max_age_days: f64,
}

impl Settings {
    /// Default TTL: one week
    pub const DEFAULT_MAX_AGE_DAYS: f64 = 7.0;

    /// Create settings from a number of days
    ///
    /// # Examples
    ///
    /// ```
    /// use tabsweep_domain::Settings;
    ///
    /// assert!(Settings::new(0.5).is_ok());
    /// assert!(Settings::new(0.0).is_err());
    /// assert!(Settings::new(-3.0).is_err());
    /// assert!(Settings::new(1e-9).is_err());
    /// ```
    pub fn new(max_age_days: f64) -> Result<Self, InvalidTtl> {
        if !max_age_days.is_finite() || max_age_days * MILLIS_PER_DAY < 1.0 {
            return Err(InvalidTtl::NotPositive(max_age_days));
        }
        Ok(Self { max_age_days })
    }

    /// Parse user input such as `"7"` or `" 1.5 "`
    pub fn parse_days(input: &str) -> Result<Self, InvalidTtl> {
        let trimmed = input.trim();
        let days: f64 = trimmed
            .parse()
            .map_err(|_| InvalidTtl::NotANumber(trimmed.to_string()))?;
        Self::new(days)
    }

    /// TTL in days
    pub fn max_age_days(&self) -> f64 {
        self.max_age_days
    }

    /// TTL in milliseconds (rounded down)
    pub fn ttl_millis(&self) -> u64 {
        (self.max_age_days * MILLIS_PER_DAY) as u64
    }

    /// TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_age_days: Self::DEFAULT_MAX_AGE_DAYS,
        }
    }
}
