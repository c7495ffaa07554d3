//! Child process helpers
//!
//! Commands run to completion with stdout and stderr captured. A non-zero exit
//! becomes [`ScriptsError::Command`] carrying the captured stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::error::{Result, ScriptsError};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working directory for the child
    pub cwd: Option<PathBuf>,
    /// Don't echo captured output to the terminal
    pub quiet: bool,
}

impl RunOptions {
    pub fn quiet() -> Self {
        RunOptions {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    /// stdout followed by stderr, for log files
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Run `command` through `sh -c`.
#[instrument(name = "run_shell", skip(options), fields(cwd = ?options.cwd))]
pub fn run_shell(command: &str, options: &RunOptions) -> Result<CommandOutput> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    run(cmd, command, options)
}

/// Run an executable file directly.
#[instrument(name = "run_executable", skip(args, options), fields(path = %path.display()))]
pub fn run_executable(path: &Path, args: &[String], options: &RunOptions) -> Result<CommandOutput> {
    let mut cmd = Command::new(path);
    cmd.args(args);
    run(cmd, &path.display().to_string(), options)
}

/// Whether `program` resolves on PATH
pub fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}

fn run(mut cmd: Command, label: &str, options: &RunOptions) -> Result<CommandOutput> {
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let output: Output = cmd
        .output()
        .map_err(|e| ScriptsError::ProcessSpawn(format!("{label}: {e}")))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms,
    };

    if !options.quiet {
        print!("{}", result.stdout);
        eprint!("{}", result.stderr);
    }

    if !output.status.success() {
        warn!(command = label, status = ?output.status.code(), duration_ms, "Command failed");
        return Err(ScriptsError::Command {
            command: label.to_string(),
            stderr: result.stderr.trim_end().to_string(),
        });
    }

    debug!(command = label, duration_ms, "Command finished");
    Ok(result)
}

fn arg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("Invalid regex"))
}

/// Split a command line on whitespace, keeping double-quoted runs together.
///
/// Quotes are stripped from the resulting arguments.
pub fn split_args(input: &str) -> Vec<String> {
    arg_regex()
        .find_iter(input)
        .map(|m| m.as_str().replace('"', ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_args_plain() {
        assert_eq!(split_args("git  commit -m"), vec!["git", "commit", "-m"]);
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_split_args_quoted() {
        assert_eq!(
            split_args(r#"echo "hello world" done"#),
            vec!["echo", "hello world", "done"]
        );
        assert_eq!(split_args(r#"--name="a b""#), vec!["--name=a b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_captures_stdout() {
        let out = run_shell("echo hi", &RunOptions::quiet()).unwrap();
        assert_eq!(out.stdout.trim(), "hi");
        assert!(out.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_failure_carries_stderr() {
        let err = run_shell("echo boom >&2; exit 3", &RunOptions::quiet()).unwrap_err();
        match err {
            ScriptsError::Command { command, stderr } => {
                assert!(command.contains("exit 3"));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_uses_cwd() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let out = run_shell("ls", &RunOptions::quiet().in_dir(dir.path())).unwrap();
        assert!(out.stdout.contains("marker"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_executable_script() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("greet");
        crate::file_manager::create_bash_file(&path).unwrap();

        let out = run_executable(&path, &[], &RunOptions::quiet()).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_missing_executable_is_spawn_error() {
        let dir = tempdir().unwrap();
        let err = run_executable(&dir.path().join("missing"), &[], &RunOptions::quiet())
            .unwrap_err();
        assert!(matches!(err, ScriptsError::ProcessSpawn(_)));
    }

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            stdout: "a\n".into(),
            stderr: "b".into(),
            duration_ms: 0,
        };
        assert_eq!(out.combined(), "a\nb");
    }
}
