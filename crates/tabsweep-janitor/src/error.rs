//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur during Janitor operations
///
/// None of these is fatal to the host: a failed pass leaves the persisted
/// map as it was and the next scheduled pass retries.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error (load or save)
    #[error("Storage error: {0}")]
    Store(String),

    /// Resource provider error (snapshot)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error, including rejected TTL input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
