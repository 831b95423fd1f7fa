//! Configuration types for the weekly digest run.
//!
//! The whole run is driven by one TOML file with four sections: `[mailer]`,
//! `[airtable]`, `[settings]` and `[logger]`. Every required field is checked
//! by [`DigestConfig::validate`] before anything else happens, so a missing
//! or malformed value fails the run up front instead of surfacing as an
//! empty string deep inside the fetch or send path.

use crate::error::{DigestError, Result};
use crate::retry::RetryPolicy;
use chrono::Weekday;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for a digest run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// SMTP delivery settings.
    pub mailer: MailerConfig,
    /// Airtable data source settings.
    pub airtable: AirtableConfig,
    /// Digest content and scheduling settings.
    pub settings: SettingsConfig,
    /// Log file settings.
    pub logger: LoggerConfig,
}

impl DigestConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DigestError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            DigestError::Config(format!("invalid config file {}: {e}", path.display()))
        })
    }

    /// Check every section; the first invalid field fails the run.
    pub fn validate(&self) -> Result<()> {
        self.mailer.validate()?;
        self.airtable.validate()?;
        self.settings.validate()?;
        self.logger.validate()
    }
}

/// SMTP delivery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// SMTP host.
    pub host: String,
    /// SMTP port (STARTTLS submission port by default).
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Total send attempts before the run is aborted.
    pub retry_count: u32,
    /// Sleep between failed attempts, in seconds.
    pub retry_sleep: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            retry_count: 3,
            retry_sleep: 30,
        }
    }
}

impl MailerConfig {
    fn validate(&self) -> Result<()> {
        non_empty("mailer.host", &self.host)?;
        non_empty("mailer.username", &self.username)?;
        non_empty("mailer.password", &self.password)?;
        if self.port == 0 {
            return Err(DigestError::Config("mailer.port must not be 0".to_owned()));
        }
        positive("mailer.retry_count", self.retry_count)
    }

    /// Retry policy for the SMTP session.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_secs(self.retry_sleep))
    }
}

/// Airtable data source configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirtableConfig {
    /// Airtable API key.
    pub api_key: String,
    /// Base identifier (the `appXXXX` part of the table URL).
    pub base_id: String,
    /// Table name within the base.
    pub table_name: String,
    /// Total fetch attempts per page before the run is aborted.
    pub retry_count: u32,
    /// Sleep between failed attempts, in seconds.
    pub retry_sleep: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table_name: String::new(),
            retry_count: 3,
            retry_sleep: 30,
        }
    }
}

impl AirtableConfig {
    fn validate(&self) -> Result<()> {
        non_empty("airtable.api_key", &self.api_key)?;
        non_empty("airtable.base_id", &self.base_id)?;
        non_empty("airtable.table_name", &self.table_name)?;
        positive("airtable.retry_count", self.retry_count)
    }

    /// Retry policy for each page fetch.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_secs(self.retry_sleep))
    }
}

/// Digest content and scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Day of week the digest goes out (full or abbreviated English name).
    pub weekday: String,
    /// Intro line placed at the top of the digest body.
    pub message: String,
    /// Sender address.
    pub sender: String,
    /// Comma-separated recipient addresses.
    pub recipients: String,
    /// Mail subject.
    pub subject: String,
    /// Flag the mail as high priority (`X-Priority: 2`).
    pub high_priority: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            weekday: "saturday".to_owned(),
            message: String::new(),
            sender: String::new(),
            recipients: String::new(),
            subject: String::new(),
            high_priority: false,
        }
    }
}

impl SettingsConfig {
    fn validate(&self) -> Result<()> {
        self.send_weekday()?;
        non_empty("settings.message", &self.message)?;
        non_empty("settings.sender", &self.sender)?;
        non_empty("settings.subject", &self.subject)?;
        if self.recipient_list().is_empty() {
            return Err(DigestError::Config(
                "settings.recipients must name at least one address".to_owned(),
            ));
        }
        Ok(())
    }

    /// Parse the configured send day.
    pub fn send_weekday(&self) -> Result<Weekday> {
        self.weekday.trim().parse().map_err(|_| {
            DigestError::Config(format!(
                "settings.weekday is not a day name: '{}'",
                self.weekday
            ))
        })
    }

    /// Split the comma-separated recipient field into trimmed addresses.
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Log file configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directory the daily log files are written to.
    pub directory: PathBuf,
    /// Number of daily log files to keep.
    pub backup_count: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            backup_count: 7,
        }
    }
}

impl LoggerConfig {
    fn validate(&self) -> Result<()> {
        if self.backup_count == 0 {
            return Err(DigestError::Config(
                "logger.backup_count must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DigestError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn positive(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(DigestError::Config(format!("{field} must be at least 1")));
    }
    Ok(())
}
