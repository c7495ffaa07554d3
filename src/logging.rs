//! Structured JSONL logging to a file plus terse stderr output.
//!
//! - **JSONL to file** (`<root>/logs/gsm.jsonl`) - every event at the active level
//! - **Compact to stderr** - warnings and errors only, unless `--verbose`
//!
//! The interactive menu owns the terminal, so stderr is kept quiet by default.
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-01-05T10:30:45.123Z","level":"INFO","target":"global_scripts_manager::scripts::store","fields":{"message":"Saved scripts (atomic)","count":3}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{load_config_from, resolve_root, Config, APP_LOG_FILE_NAME};
use crate::scripts::LOGS_DIR;

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

fn stderr_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Initialize file and stderr logging under `log_dir`.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
pub fn init(log_dir: &Path, verbose: bool) -> LoggingGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(APP_LOG_FILE_NAME);

    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(verbose)
        .with_level(true)
        .without_time()
        .compact()
        .with_filter(stderr_level(verbose));

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
        log_path,
    }
}

/// Resolve the root, start logging under `<root>/logs`, then load `<root>/config.json`.
///
/// The config file is read after the subscriber is installed so its warnings reach the log.
pub fn init_with_config(root_flag: Option<&Path>, verbose: bool) -> (Config, LoggingGuard) {
    let root = resolve_root(root_flag);
    let guard = init(&root.join(LOGS_DIR), verbose);
    (load_config_from(root), guard)
}

/// Log the outcome of running a script with structured fields
pub fn log_script_event(script_id: &str, action: &str, duration_ms: Option<u64>, success: bool) {
    match duration_ms {
        Some(duration) => {
            tracing::info!(
                event_type = "script_event",
                script_id = script_id,
                action = action,
                duration_ms = duration,
                success = success,
                "Script {} {}",
                action,
                script_id
            );
        }
        None => {
            tracing::info!(
                event_type = "script_event",
                script_id = script_id,
                action = action,
                success = success,
                "Script {} {}",
                action,
                script_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_level_follows_verbose() {
        assert_eq!(stderr_level(false), LevelFilter::WARN);
        assert_eq!(stderr_level(true), LevelFilter::DEBUG);
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let guard = init(&log_dir, false);
        assert_eq!(guard.log_path(), log_dir.join(APP_LOG_FILE_NAME));
        assert!(guard.log_path().exists());
    }

    #[test]
    fn test_init_with_config_logs_under_root_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("config.json"), "{ nope").unwrap();

        let (config, guard) = init_with_config(Some(&root), false);

        assert_eq!(config, Config::with_root(&root));
        assert_eq!(guard.log_path(), config.log_dir().join(APP_LOG_FILE_NAME));
        assert!(guard.log_path().exists());
    }
}
