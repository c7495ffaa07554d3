//! Script record type definitions
//!
//! This module contains the persisted script record, the input for creating one,
//! the partial update used by edits, and the per-field change type used by the
//! edit session.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reactive::Record;
use crate::tags::normalize_tags;

/// Opaque script identifier, generated once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(String);

impl ScriptId {
    pub fn generate() -> Self {
        ScriptId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptId {
    fn from(value: &str) -> Self {
        ScriptId(value.to_string())
    }
}

/// One recorded run that produced a log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLog {
    pub filepath: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// A managed script and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: ScriptId,
    pub name: String,
    /// Absolute path of the script file, `<scripts root>/<name>-<id>/<name>`
    pub filepath: PathBuf,
    /// Whether the script's folder is registered on the shell PATH
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    /// Cron-like expression, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<ScriptLog>,
}

impl Script {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Input for [`ScriptsModel::add_script`](super::ScriptsModel::add_script)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewScript {
    pub name: String,
    pub tags: Vec<String>,
    pub is_global: bool,
    pub is_pinned: bool,
    pub schedule: Option<String>,
}

impl NewScript {
    pub fn named(name: impl Into<String>) -> Self {
        NewScript {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = is_global;
        self
    }
}

/// Partial update for an existing script. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptPatch {
    pub name: Option<String>,
    pub filepath: Option<PathBuf>,
    pub tags: Option<Vec<String>>,
    pub is_global: Option<bool>,
    pub is_pinned: Option<bool>,
    pub schedule: Option<Option<String>>,
    pub last_run: Option<Option<DateTime<Utc>>>,
    pub logs: Option<Vec<ScriptLog>>,
}

impl ScriptPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn filepath(mut self, filepath: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn is_global(mut self, is_global: bool) -> Self {
        self.is_global = Some(is_global);
        self
    }

    pub fn is_pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    pub fn schedule(mut self, schedule: Option<String>) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Take every field from `script` except its id.
    pub fn from_script(script: &Script) -> Self {
        ScriptPatch {
            name: Some(script.name.clone()),
            filepath: Some(script.filepath.clone()),
            tags: Some(script.tags.clone()),
            is_global: Some(script.is_global),
            is_pinned: Some(script.is_pinned),
            schedule: Some(script.schedule.clone()),
            last_run: Some(script.last_run),
            logs: Some(script.logs.clone()),
        }
    }

    /// Merge onto `script`. The id is never touched.
    pub fn apply_to(&self, script: &Script) -> Script {
        let mut merged = script.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(filepath) = &self.filepath {
            merged.filepath = filepath.clone();
        }
        if let Some(tags) = &self.tags {
            merged.tags = normalize_tags(tags.iter().cloned());
        }
        if let Some(is_global) = self.is_global {
            merged.is_global = is_global;
        }
        if let Some(is_pinned) = self.is_pinned {
            merged.is_pinned = is_pinned;
        }
        if let Some(schedule) = &self.schedule {
            merged.schedule = schedule.clone();
        }
        if let Some(last_run) = self.last_run {
            merged.last_run = last_run;
        }
        if let Some(logs) = &self.logs {
            merged.logs = logs.clone();
        }
        merged
    }
}

/// Editable fields of a [`Script`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptField {
    Name,
    Filepath,
    Tags,
    IsGlobal,
    IsPinned,
    Schedule,
}

/// One field's new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptChange {
    /// A rename moves the file too, so name and path change together
    Rename { name: String, filepath: PathBuf },
    Filepath(PathBuf),
    Tags(Vec<String>),
    IsGlobal(bool),
    IsPinned(bool),
    Schedule(Option<String>),
}

impl Record for Script {
    type Key = ScriptField;
    type Change = ScriptChange;

    fn key_of(change: &ScriptChange) -> ScriptField {
        match change {
            ScriptChange::Rename { .. } => ScriptField::Name,
            ScriptChange::Filepath(_) => ScriptField::Filepath,
            ScriptChange::Tags(_) => ScriptField::Tags,
            ScriptChange::IsGlobal(_) => ScriptField::IsGlobal,
            ScriptChange::IsPinned(_) => ScriptField::IsPinned,
            ScriptChange::Schedule(_) => ScriptField::Schedule,
        }
    }

    fn apply(&mut self, change: ScriptChange) {
        *self = ScriptPatch::from(change).apply_to(self);
    }
}

impl From<ScriptChange> for ScriptPatch {
    fn from(change: ScriptChange) -> Self {
        let patch = ScriptPatch::new();
        match change {
            ScriptChange::Rename { name, filepath } => patch.name(name).filepath(filepath),
            ScriptChange::Filepath(filepath) => patch.filepath(filepath),
            ScriptChange::Tags(tags) => patch.tags(tags),
            ScriptChange::IsGlobal(is_global) => patch.is_global(is_global),
            ScriptChange::IsPinned(is_pinned) => patch.is_pinned(is_pinned),
            ScriptChange::Schedule(schedule) => patch.schedule(schedule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Script {
        Script {
            id: ScriptId::from("abc"),
            name: "backup".to_string(),
            filepath: PathBuf::from("/root/scripts/backup-abc/backup"),
            is_global: false,
            tags: vec!["ops".to_string()],
            is_pinned: false,
            schedule: None,
            last_run: None,
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_script_json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["isGlobal"], false);
        assert_eq!(json["isPinned"], false);
        assert_eq!(json["id"], "abc");
        assert!(json.get("schedule").is_none());
        assert!(json.get("lastRun").is_none());
    }

    #[test]
    fn test_script_deserializes_with_missing_optional_fields() {
        let json = r#"{"id":"x","name":"n","filepath":"/a/n-x/n","isGlobal":true}"#;
        let script: Script = serde_json::from_str(json).unwrap();
        assert!(script.is_global);
        assert!(script.tags.is_empty());
        assert!(script.logs.is_empty());
        assert!(!script.is_pinned);
    }

    #[test]
    fn test_log_entry_field_names() {
        let log = ScriptLog {
            filepath: PathBuf::from("/logs/1.log"),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("filepath").is_some());
    }

    #[test]
    fn test_patch_keeps_unspecified_fields() {
        let original = sample();
        let merged = ScriptPatch::new().is_pinned(true).apply_to(&original);
        assert!(merged.is_pinned);
        assert_eq!(merged.name, original.name);
        assert_eq!(merged.tags, original.tags);
        assert_eq!(merged.id, original.id);
    }

    #[test]
    fn test_patch_dedups_tags() {
        let merged = ScriptPatch::new()
            .tags(vec!["a".into(), "b".into(), "a".into()])
            .apply_to(&sample());
        assert_eq!(merged.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_patch_can_clear_schedule() {
        let mut script = sample();
        script.schedule = Some("0 9 * * *".into());
        let merged = ScriptPatch::new().schedule(None).apply_to(&script);
        assert_eq!(merged.schedule, None);
    }

    #[test]
    fn test_record_rename_changes_name_and_path() {
        let mut script = sample();
        let change = ScriptChange::Rename {
            name: "restore".into(),
            filepath: PathBuf::from("/root/scripts/backup-abc/restore"),
        };
        assert_eq!(Script::key_of(&change), ScriptField::Name);
        script.apply(change);
        assert_eq!(script.name, "restore");
        assert_eq!(script.filepath, PathBuf::from("/root/scripts/backup-abc/restore"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ScriptId::generate(), ScriptId::generate());
    }
}
