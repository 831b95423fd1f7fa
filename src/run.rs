//! Orchestration of one digest run.
//!
//! Strictly sequential: the fetch must fully succeed before the digest is
//! composed, and composition must fully succeed before any send attempt
//! begins. A retry-exhausted fetch therefore means no mail goes out at all.

use crate::airtable::AirtableClient;
use crate::config::DigestConfig;
use crate::digest;
use crate::error::Result;
use crate::mailer::{self, Mailer};
use chrono::Weekday;
use tracing::{debug, info};

/// Outcome of a digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The digest was composed and sent.
    Sent,
    /// Today is not the configured send day; nothing was done.
    Skipped,
}

/// True when `today` matches the configured send day.
pub fn is_send_day(config: &DigestConfig, today: Weekday) -> Result<bool> {
    Ok(config.settings.send_weekday()? == today)
}

/// Execute one run: gate on the weekday, fetch, select, send.
pub async fn execute(config: &DigestConfig, today: Weekday) -> Result<RunOutcome> {
    if !is_send_day(config, today)? {
        info!(
            "today is {today}, send day is {}; skipping run",
            config.settings.weekday
        );
        return Ok(RunOutcome::Skipped);
    }

    let client = AirtableClient::new(config.airtable.clone());
    let records = client.fetch_records().await?;

    let body = digest::build_digest(&records, &config.settings.message, &mut rand::thread_rng());
    debug!("digest body:\n{body}");

    let message = mailer::compose(
        &config.settings.sender,
        &config.settings.recipient_list(),
        &config.settings.subject,
        &body,
        config.settings.high_priority,
    )?;

    Mailer::new(config.mailer.clone()).send(&message).await?;
    Ok(RunOutcome::Sent)
}
