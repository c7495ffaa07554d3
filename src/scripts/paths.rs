//! Where scripts, logs and the metadata document live on disk
//!
//! Everything here is pure path arithmetic. No function touches the filesystem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::types::{Script, ScriptId};

/// File name of the metadata document inside the metadata folder
pub const SCRIPTS_JSON_FILE: &str = "scripts.json";

/// Folder under the root that holds one subfolder per script
pub const SCRIPTS_DIR: &str = "scripts";

/// Folder under the root that holds run logs and the application log
pub const LOGS_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsHandler {
    json_folder: PathBuf,
    scripts_root: PathBuf,
}

impl PathsHandler {
    pub fn new(json_folder: impl Into<PathBuf>, scripts_root: impl Into<PathBuf>) -> Self {
        PathsHandler {
            json_folder: json_folder.into(),
            scripts_root: scripts_root.into(),
        }
    }

    /// Standard layout: document in `root`, scripts in `root/scripts`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root, root.join(SCRIPTS_DIR))
    }

    pub fn json_folder(&self) -> &Path {
        &self.json_folder
    }

    pub fn scripts_root(&self) -> &Path {
        &self.scripts_root
    }

    /// `<scripts root>/<name>-<id>/<name>`
    pub fn path_for_script(&self, id: &ScriptId, name: &str) -> PathBuf {
        self.scripts_root.join(format!("{}-{}", name, id)).join(name)
    }

    pub fn folder_for_script(&self, script: &Script) -> PathBuf {
        script
            .filepath
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.scripts_root.clone())
    }

    pub fn json_file_path(&self) -> PathBuf {
        self.json_folder.join(SCRIPTS_JSON_FILE)
    }

    pub fn logs_root(&self) -> PathBuf {
        self.json_folder.join(LOGS_DIR)
    }

    /// Keyed by id only, so renamed scripts keep a single log folder.
    pub fn log_folder_for_script(&self, script: &Script) -> PathBuf {
        self.logs_root().join(script.id.as_str())
    }

    pub fn log_path_for_run(&self, script: &Script, at: DateTime<Utc>) -> PathBuf {
        self.log_folder_for_script(script)
            .join(format!("{}.log", at.format("%Y%m%dT%H%M%S%.3fZ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn script_at(filepath: &str) -> Script {
        Script {
            id: ScriptId::from("42"),
            name: "hello".into(),
            filepath: PathBuf::from(filepath),
            is_global: false,
            tags: Vec::new(),
            is_pinned: false,
            schedule: None,
            last_run: None,
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_path_for_script_layout() {
        let paths = PathsHandler::from_root("/home/me/.gsm");
        let path = paths.path_for_script(&ScriptId::from("42"), "hello");
        assert_eq!(path, PathBuf::from("/home/me/.gsm/scripts/hello-42/hello"));
    }

    #[test]
    fn test_path_for_script_is_deterministic() {
        let paths = PathsHandler::new("/meta", "/elsewhere");
        let id = ScriptId::from("abc");
        assert_eq!(paths.path_for_script(&id, "x"), paths.path_for_script(&id, "x"));
        assert!(paths.path_for_script(&id, "x").starts_with("/elsewhere"));
    }

    #[test]
    fn test_folder_for_script_is_parent() {
        let paths = PathsHandler::from_root("/r");
        let script = script_at("/r/scripts/hello-42/hello");
        assert_eq!(
            paths.folder_for_script(&script),
            PathBuf::from("/r/scripts/hello-42")
        );
    }

    #[test]
    fn test_json_file_path() {
        let paths = PathsHandler::from_root("/r");
        assert_eq!(paths.json_file_path(), PathBuf::from("/r/scripts.json"));
    }

    #[test]
    fn test_log_path_for_run() {
        let paths = PathsHandler::from_root("/r");
        let script = script_at("/r/scripts/hello-42/hello");
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            paths.log_path_for_run(&script, at),
            PathBuf::from("/r/logs/42/20240501T123000.000Z.log")
        );
    }
}
