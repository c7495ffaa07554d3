//! JSON persistence for the script collection
//!
//! The whole collection plus the tag registry is written as one pretty-printed
//! document:
//!
//! ```json
//! { "metadata": { "tags": ["git"] }, "scripts": [ ... ] }
//! ```
//!
//! Saves go to a temp file next to the document which is then renamed over it,
//! so readers never observe a half-written document.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::{Result, ScriptsError};

use super::paths::PathsHandler;
use super::types::Script;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
}

/// On-disk shape of `scripts.json` (owned, for loading)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsDocument {
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub scripts: Vec<Script>,
}

/// Borrowed form for saving without cloning the collection
#[derive(Serialize)]
struct ScriptsDocumentRef<'a> {
    metadata: DocumentMetadata,
    scripts: &'a [Script],
}

#[derive(Debug, Clone)]
pub struct ScriptsJsonHandler {
    paths: PathsHandler,
    /// Every tag ever seen. Only grows.
    tags: BTreeSet<String>,
}

impl ScriptsJsonHandler {
    pub fn new(paths: PathsHandler) -> Self {
        ScriptsJsonHandler {
            paths,
            tags: BTreeSet::new(),
        }
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Overwrite the document with `scripts` and the current tag registry.
    #[instrument(name = "write_scripts", skip_all, fields(count = scripts.len()))]
    pub fn write_scripts_to_file(&self, scripts: &[Script]) -> Result<()> {
        let folder = self.paths.json_folder();
        std::fs::create_dir_all(folder).map_err(|e| ScriptsError::io(folder, e))?;

        let json = serde_json::to_string_pretty(&ScriptsDocumentRef {
            metadata: DocumentMetadata {
                tags: self.tags.iter().cloned().collect(),
            },
            scripts,
        })?;

        let file_path = self.paths.json_file_path();
        let temp_path = file_path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json).map_err(|e| ScriptsError::io(&temp_path, e))?;
        // Atomic on Unix
        std::fs::rename(&temp_path, &file_path).map_err(|e| ScriptsError::io(&file_path, e))?;

        info!(
            path = %file_path.display(),
            tag_count = self.tags.len(),
            bytes = json.len(),
            "Saved scripts (atomic)"
        );
        Ok(())
    }

    /// Read the document, merging its tags into the registry.
    ///
    /// Any failure is logged and reported as `None` so the caller can start empty.
    #[instrument(name = "load_scripts", skip(self))]
    pub fn load_scripts_from_file(&mut self) -> Option<ScriptsDocument> {
        let file_path = self.paths.json_file_path();
        if !file_path.exists() {
            info!(path = %file_path.display(), "Scripts file not found, starting fresh");
            return None;
        }

        let document = match Self::read_document(&file_path) {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, path = %file_path.display(), "Error when reading scripts file");
                return None;
            }
        };

        self.add_tags(document.metadata.tags.iter().cloned());
        info!(
            path = %file_path.display(),
            script_count = document.scripts.len(),
            tag_count = self.tags.len(),
            "Loaded scripts"
        );
        Some(document)
    }

    /// Scripts from the document, or an empty list when it can't be loaded.
    pub fn load_or_empty(&mut self) -> Vec<Script> {
        self.load_scripts_from_file()
            .map(|document| document.scripts)
            .unwrap_or_default()
    }

    fn read_document(path: &std::path::Path) -> Result<ScriptsDocument> {
        let content = std::fs::read_to_string(path).map_err(|e| ScriptsError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}
