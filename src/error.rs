use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Error severity for terminal display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable, the user can retry
    Error,    // operation failed
    Critical, // the process cannot continue
}

/// Domain-specific errors for the scripts manager
#[derive(Error, Debug)]
pub enum ScriptsError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("A script named '{0}' already exists")]
    DuplicateName(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No script named '{0}'")]
    UnknownScript(String),

    #[error("I/O failed for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process scripts JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Running the '{command}' command caused this error: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Process spawn failed: {0}")]
    ProcessSpawn(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScriptsError {
    /// Wrap an `std::io::Error` together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(_) => ErrorSeverity::Warning,
            Self::DuplicateName(_) => ErrorSeverity::Warning,
            Self::NotFound(_) => ErrorSeverity::Error,
            Self::UnknownScript(_) => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Error,
            Self::Json(_) => ErrorSeverity::Error,
            Self::Command { .. } => ErrorSeverity::Error,
            Self::ProcessSpawn(_) => ErrorSeverity::Error,
            Self::Prompt(_) => ErrorSeverity::Critical,
            Self::Clipboard(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::DuplicateName(name) => format!(
                "Script name '{}' already exists. Please choose a different name.",
                name
            ),
            Self::NotFound(path) => format!("File not found: {}", path.display()),
            Self::UnknownScript(name) => format!("No script named '{}'", name),
            Self::Io { path, source } => format!("Could not access {}: {}", path.display(), source),
            Self::Json(e) => format!("Invalid scripts file: {}", e),
            Self::Command { command, .. } => format!("Command '{}' failed", command),
            Self::ProcessSpawn(msg) => format!("Could not start process: {}", msg),
            Self::Prompt(msg) => format!("Prompt closed: {}", msg),
            Self::Clipboard(msg) => format!("Clipboard unavailable: {}", msg),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
        }
    }

    /// Validation errors are answered by asking the user again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::DuplicateName(_))
    }
}

pub type Result<T> = std::result::Result<T, ScriptsError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is best-effort and the larger flow should continue.
///
/// # Examples
///
/// ```ignore
/// use global_scripts_manager::error::ResultExt;
///
/// // A log file that can't be removed must not abort the delete flow
/// FileManager::remove_file(&log.filepath).log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_carries_command_and_stderr() {
        let err = ScriptsError::Command {
            command: "false".to_string(),
            stderr: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("'false'"));
        assert!(text.contains("boom"));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_validation_errors_are_retryable() {
        assert!(ScriptsError::Validation("empty".into()).is_retryable());
        assert!(ScriptsError::DuplicateName("foo".into()).is_retryable());
        assert!(!ScriptsError::NotFound(PathBuf::from("/x")).is_retryable());
    }

    #[test]
    fn test_user_message_duplicate_name() {
        let msg = ScriptsError::DuplicateName("deploy".into()).user_message();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("different name"));
    }

    #[test]
    fn test_log_err_returns_none_on_error() {
        let result: std::result::Result<u8, &str> = Err("nope");
        assert_eq!(result.log_err(), None);
        let ok: std::result::Result<u8, &str> = Ok(3);
        assert_eq!(ok.warn_on_err(), Some(3));
    }
}
