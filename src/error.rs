//! Error types for the digest mailer.

/// Top-level error type for a digest run.
///
/// Only two kinds of failure matter at the run level: a single failed network
/// attempt (recovered by the retry policy) and [`DigestError::RetryExhausted`]
/// (fatal, aborts the run).
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Configuration load or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// One failed Airtable fetch attempt.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// One failed SMTP attempt.
    #[error("mail error: {0}")]
    Mail(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// All attempts for a retried operation failed.
    ///
    /// Carries the error from the final attempt. This aborts the whole run;
    /// there is no partial-failure path.
    #[error("{operation} gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Human-readable name of the operation that was retried.
        operation: String,
        /// Total number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        last: Box<DigestError>,
    },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DigestError>;
