//! CLI entry point for the weekly digest job.

use chrono::Datelike;
use clap::{Parser, ValueEnum};
use projectmail::config::DigestConfig;
use projectmail::logging::{self, RotatingLogWriter};
use projectmail::run::{self, RunOutcome};
use std::path::PathBuf;
use tracing::{error, info};

/// Weekly Airtable project digest mailer.
#[derive(Parser)]
#[command(name = "projectmail", version, about)]
struct Cli {
    /// Log verbosity.
    #[arg(short = 'l', long = "log", value_enum, default_value_t = LogLevel::Info)]
    log: LogLevel,

    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Console and file log verbosity.
#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DigestConfig::from_file(&cli.config)?;
    config.validate()?;

    let writer = RotatingLogWriter::open(&config.logger.directory, config.logger.backup_count)?;
    let _guard = logging::init(cli.log.directive(), writer);

    info!("digest run started");
    let today = chrono::Local::now().weekday();
    match run::execute(&config, today).await {
        Ok(RunOutcome::Sent) => {
            info!("digest run finished");
            Ok(())
        }
        Ok(RunOutcome::Skipped) => Ok(()),
        Err(e) => {
            error!("digest run aborted: {e}");
            Err(e.into())
        }
    }
}
