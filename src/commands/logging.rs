//! Per-run file logging for Lepton.
//!
//! Backend and webview both log into one file per process run, named after
//! the UTC start time. Old run logs are pruned at startup.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{Level, LevelFilter};
use tauri::{command, State};

use crate::app::AppContext;
use crate::error::{LeptonError, LeptonResult};

/// Maximum number of run logs to keep
pub const MAX_LOG_FILES: usize = 10;

/// Extra module filters, `RUST_LOG` syntax.
pub const LOG_FILTER_ENV: &str = "LEPTON_LOG";

/// `2026-10-18T09.54.00.123Z.log`: ISO-8601 with ':' replaced so the name is
/// valid on every filesystem.
pub fn log_file_name(started: DateTime<Utc>) -> String {
    let stamp = started.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    format!("{}.log", stamp.replace(':', "."))
}

/// Clean up old log files, keeping only the most recent `keep`
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "log")
                    .unwrap_or(false)
            })
            .collect();

        // Names sort chronologically; newest first
        log_files.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

        for file in log_files.into_iter().skip(keep) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// Writes every line to the run file, and to stderr in debug builds.
struct RunLogWriter {
    file: File,
    mirror: bool,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.mirror {
            let _ = io::stderr().write_all(buf);
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Create the log directory and this run's file, prune old runs, and install
/// the global logger at `level`.
///
/// Returns the path of the new log file.
pub fn init_logging(log_dir: &Path, level: LevelFilter) -> LeptonResult<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| {
        LeptonError::Logging(format!("Failed to create log directory: {}", e))
    })?;

    let log_file_path = log_dir.join(log_file_name(Utc::now()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| LeptonError::Logging(format!("Failed to open log file: {}", e)))?;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(RunLogWriter {
            file,
            mirror: cfg!(debug_assertions),
        })));

    if let Ok(filters) = std::env::var(LOG_FILTER_ENV) {
        builder.parse_filters(&filters);
    }

    builder
        .try_init()
        .map_err(|e| LeptonError::Logging(e.to_string()))?;

    cleanup_old_logs(log_dir, MAX_LOG_FILES);
    log::info!("Log directory: {:?}", log_dir);
    Ok(log_file_path)
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" | "warning" => Level::Warn,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Write a log message from the frontend
#[command]
pub fn write_log(level: String, source: String, message: String) {
    log::log!(target: "webview", parse_level(&level), "[{}] {}", source, message);
}

/// Get the log directory path
#[command]
pub fn get_log_dir(ctx: State<'_, AppContext>) -> String {
    ctx.paths.log_dir.to_string_lossy().to_string()
}
