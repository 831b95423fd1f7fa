//! Bounded retry for fallible network operations.
//!
//! One [`RetryPolicy`] wraps both blocking points of a run: each Airtable
//! page fetch and the SMTP connect+authenticate+send unit. A fixed number of
//! attempts with a fixed sleep between them; exhausting the budget returns
//! [`DigestError::RetryExhausted`] and aborts the run.

use crate::error::{DigestError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// Fixed-count, fixed-sleep retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    sleep: Duration,
}

impl RetryPolicy {
    /// Create a policy with `max_attempts` total invocations and `sleep`
    /// between failed attempts. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, sleep: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            sleep,
        }
    }

    /// Total invocations this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `attempt` until it succeeds or the budget is exhausted.
    ///
    /// On success the result is returned immediately with no further
    /// attempts and no sleep. Each failure is logged at error severity with
    /// attempt context, then the policy sleeps before the next invocation.
    /// There is no trailing sleep after the final failure: `max_attempts`
    /// invocations, `max_attempts - 1` sleeps.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt_no = 0;
        loop {
            attempt_no += 1;
            match attempt().await {
                Ok(value) => {
                    debug!(
                        "{operation} succeeded on attempt {attempt_no}/{}",
                        self.max_attempts
                    );
                    return Ok(value);
                }
                Err(e) if attempt_no < self.max_attempts => {
                    error!(
                        "{operation} attempt {attempt_no}/{} failed: {e}",
                        self.max_attempts
                    );
                    tokio::time::sleep(self.sleep).await;
                }
                Err(e) => {
                    error!(
                        "{operation} attempt {attempt_no}/{} failed: {e}",
                        self.max_attempts
                    );
                    return Err(DigestError::RetryExhausted {
                        operation: operation.to_owned(),
                        attempts: self.max_attempts,
                        last: Box::new(e),
                    });
                }
            }
        }
    }
}
