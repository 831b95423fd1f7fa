//! Console plus rotating-file logging for digest runs.
//!
//! Each run appends to a daily log file `digest-YYYY-MM-DD.log` in the
//! configured log directory. Opening the writer prunes files beyond the
//! configured `backup_count` (oldest first, by modification time), so a
//! cron job that fires weekly keeps a bounded trail on disk.

use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Append-only writer for today's log file.
///
/// Pruning happens once, on open. Subsequent writes go to the same file
/// for the lifetime of this instance; a run never crosses midnight in
/// practice, so per-write rollover is not needed.
pub struct RotatingLogWriter {
    path: PathBuf,
    file: File,
}

impl RotatingLogWriter {
    /// Open (or create) today's log file in `log_dir`, keeping at most
    /// `backup_count` existing log files.
    pub fn open(log_dir: &Path, backup_count: usize) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        prune_old_logs(log_dir, backup_count.max(1));

        let path = log_dir.join(today_log_filename());
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self { path, file })
    }

    /// Path of the log file currently being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for RotatingLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Install the global subscriber: console output plus the file writer.
///
/// `default_level` is the CLI verbosity (`debug`/`info`/`warn`/`error`);
/// a `RUST_LOG` environment filter takes precedence when set. The returned
/// guard must be held for the life of the process so buffered file output
/// is flushed on exit.
pub fn init(default_level: &str, writer: RotatingLogWriter) -> WorkerGuard {
    let (file_writer, guard) = tracing_appender::non_blocking(writer);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}

/// Today's log filename, `digest-YYYY-MM-DD.log`.
fn today_log_filename() -> String {
    format!("digest-{}.log", Utc::now().format("%Y-%m-%d"))
}

/// Keep the newest `keep` matching log files, delete the rest.
fn prune_old_logs(log_dir: &Path, keep: usize) {
    let mut entries: Vec<(PathBuf, SystemTime)> = match fs::read_dir(log_dir) {
        Ok(dir) => dir
            .flatten()
            .filter_map(|e| {
                let path = e.path();
                let name = path.file_name()?.to_str()?.to_owned();
                if name.starts_with("digest-") && name.ends_with(".log") {
                    let mtime = path.metadata().ok()?.modified().ok()?;
                    Some((path, mtime))
                } else {
                    None
                }
            })
            .collect(),
        Err(_) => return,
    };

    // Newest first; everything past the keep limit goes.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    for (path, _) in entries.iter().skip(keep) {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn today_log_filename_has_expected_shape() {
        let name = today_log_filename();
        assert!(name.starts_with("digest-"), "unexpected name: {name}");
        assert!(name.ends_with(".log"), "unexpected name: {name}");
        // digest-YYYY-MM-DD.log
        assert_eq!(name.len(), "digest-2026-01-01.log".len());
    }

    #[test]
    fn open_creates_todays_file() {
        let tmp = tempfile::tempdir().unwrap();

        let mut writer = RotatingLogWriter::open(tmp.path(), 7).unwrap();
        writeln!(writer, "first line").unwrap();

        let path = writer.path().to_path_buf();
        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("first line"));
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let tmp = tempfile::tempdir().unwrap();

        {
            let mut w = RotatingLogWriter::open(tmp.path(), 7).unwrap();
            writeln!(w, "first run").unwrap();
        }
        {
            let mut w = RotatingLogWriter::open(tmp.path(), 7).unwrap();
            writeln!(w, "second run").unwrap();
        }

        let content = fs::read_to_string(tmp.path().join(today_log_filename())).unwrap();
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn prune_keeps_only_backup_count_files() {
        let tmp = tempfile::tempdir().unwrap();

        for day in 1..=6 {
            let name = format!("digest-2026-01-{day:02}.log");
            fs::write(tmp.path().join(name), "old").unwrap();
            // Distinct modification times so the sort order is stable.
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        prune_old_logs(tmp.path(), 3);

        let remaining: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        assert_eq!(remaining.len(), 3);
        // The most recently written file always survives.
        assert!(remaining.contains(&"digest-2026-01-06.log".to_owned()));
    }

    #[test]
    fn prune_ignores_unrelated_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), "keep me").unwrap();
        fs::write(tmp.path().join("digest-2026-01-01.log"), "old").unwrap();

        prune_old_logs(tmp.path(), 1);

        assert!(tmp.path().join("notes.txt").exists());
        assert!(tmp.path().join("digest-2026-01-01.log").exists());
    }
}
