//! Weekly project digest mailer.
//!
//! Fetches project rows from an Airtable table, selects every record
//! flagged "do soon" plus one open record per category, composes a
//! plain-text digest and delivers it over SMTP. Meant to run from cron:
//! the run is a no-op unless today matches the configured send day.
//!
//! # Pipeline
//!
//! One run is strictly sequential:
//! fetch (Airtable) → select (digest) → send (SMTP)
//!
//! Both blocking points (the HTTP fetch and the SMTP session) are wrapped
//! in the same bounded-retry policy ([`retry::RetryPolicy`]); exhausting it
//! aborts the whole run. There is no cross-run state.

pub mod airtable;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod retry;
pub mod run;

pub use config::DigestConfig;
pub use digest::{ProjectRecord, build_digest};
pub use error::{DigestError, Result};
pub use retry::RetryPolicy;
pub use run::{RunOutcome, execute};
