//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::scripts::{PathsHandler, LOGS_DIR};

/// Settings from `<root>/config.json` plus the resolved root folder.
///
/// Every setting is optional in the file; the `get_*` accessors apply defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Resolved at startup, never read from the file
    #[serde(skip)]
    pub root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    /// Shell used to pick the profile file (defaults to $SHELL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    /// Delay between streamed text chunks (milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_delay_ms: Option<u64>,
    /// Characters per streamed chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// Spinners and streamed text; off prints plain lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<bool>,
}

impl Config {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Config {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> PathsHandler {
        PathsHandler::from_root(&self.root)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Returns the editor from config, falling back to $EDITOR, then DEFAULT_EDITOR
    pub fn get_editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    /// Returns the shell from config, falling back to $SHELL
    pub fn get_shell(&self) -> Option<String> {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
    }

    pub fn get_stream_delay_ms(&self) -> u64 {
        self.stream_delay_ms.unwrap_or(DEFAULT_STREAM_DELAY_MS)
    }

    /// Never zero
    pub fn get_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1)
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations.unwrap_or(DEFAULT_ANIMATIONS)
    }
}
