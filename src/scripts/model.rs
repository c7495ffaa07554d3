//! In-memory script collection
//!
//! [`ScriptsModel`] owns the ordered list of scripts inside a [`Signal`]. Every
//! mutation replaces the whole list through [`ScriptsModel::set_scripts`], so
//! effects registered with [`ScriptsModel::on_scripts_change`] run after each
//! create, edit and delete. Nothing here touches the disk.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScriptsError};
use crate::reactive::{create_effect, Effect, Signal};
use crate::tags::normalize_tags;

use super::paths::PathsHandler;
use super::types::{NewScript, Script, ScriptId, ScriptLog, ScriptPatch};

fn script_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex"))
}

/// Check that `name` is usable as a file and folder name.
///
/// Only ASCII letters, digits, `-` and `_` are allowed.
pub fn validate_script_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ScriptsError::Validation(
            "Script name cannot be empty".to_string(),
        ));
    }
    if !script_name_regex().is_match(name) {
        return Err(ScriptsError::Validation(format!(
            "Script name '{}' may only contain letters, digits, '-' and '_'",
            name
        )));
    }
    Ok(())
}

pub struct ScriptsModel {
    paths: PathsHandler,
    scripts: Signal<Vec<Script>>,
}

impl ScriptsModel {
    pub fn new(paths: PathsHandler, scripts: Vec<Script>) -> Self {
        ScriptsModel {
            paths,
            scripts: Signal::new(scripts),
        }
    }

    pub fn paths(&self) -> &PathsHandler {
        &self.paths
    }

    /// Snapshot of the collection. Does not subscribe the running effect.
    pub fn scripts(&self) -> Vec<Script> {
        self.scripts.get_untracked()
    }

    pub fn len(&self) -> usize {
        self.scripts.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The only write path for the collection.
    fn set_scripts(&self, scripts: Vec<Script>) {
        debug!(count = scripts.len(), "Scripts collection updated");
        self.scripts.set(scripts);
    }

    /// Run `callback` now and after every change to the collection.
    pub fn on_scripts_change(&self, mut callback: impl FnMut(&[Script]) + 'static) -> Effect {
        let scripts = self.scripts.clone();
        create_effect(move || {
            let current = scripts.get();
            callback(&current)
        })
    }

    pub fn is_script_name_unique(&self, name: &str) -> bool {
        self.scripts
            .with_untracked(|scripts| scripts.iter().all(|script| script.name != name))
    }

    #[instrument(name = "add_script", skip_all, fields(name = %new_script.name))]
    pub fn add_script(&self, new_script: NewScript) -> Result<Script> {
        validate_script_name(&new_script.name)?;
        if !self.is_script_name_unique(&new_script.name) {
            return Err(ScriptsError::DuplicateName(new_script.name));
        }

        let id = ScriptId::generate();
        let script = Script {
            filepath: self.paths.path_for_script(&id, &new_script.name),
            id,
            name: new_script.name,
            is_global: new_script.is_global,
            tags: normalize_tags(new_script.tags),
            is_pinned: new_script.is_pinned,
            schedule: new_script.schedule,
            last_run: None,
            logs: Vec::new(),
        };

        let mut scripts = self.scripts();
        scripts.push(script.clone());
        self.set_scripts(scripts);

        info!(id = %script.id, path = %script.filepath.display(), "Added script");
        Ok(script)
    }

    /// Merge `patch` onto the script with `script.id` and store the result.
    ///
    /// When no script has that id the merged record is still returned, but the
    /// collection is left as is.
    #[instrument(name = "edit_script", skip_all, fields(id = %script.id))]
    pub fn edit_script(&self, script: &Script, patch: ScriptPatch) -> Result<Script> {
        if let Some(new_name) = &patch.name {
            validate_script_name(new_name)?;
            let taken = self.scripts.with_untracked(|scripts| {
                scripts
                    .iter()
                    .any(|other| other.id != script.id && &other.name == new_name)
            });
            if taken {
                return Err(ScriptsError::DuplicateName(new_name.clone()));
            }
        }

        let updated = patch.apply_to(script);
        let mut found = false;
        let scripts: Vec<Script> = self
            .scripts()
            .into_iter()
            .map(|existing| {
                if existing.id == script.id {
                    found = true;
                    updated.clone()
                } else {
                    existing
                }
            })
            .collect();

        if found {
            self.set_scripts(scripts);
        } else {
            warn!("Edited script is not in the collection, nothing stored");
        }
        Ok(updated)
    }

    pub fn query_scripts(&self, predicate: impl Fn(&Script) -> bool) -> Vec<Script> {
        self.scripts.with_untracked(|scripts| {
            scripts
                .iter()
                .filter(|script| predicate(script))
                .cloned()
                .collect()
        })
    }

    pub fn get_script_by_id(&self, id: &ScriptId) -> Option<Script> {
        self.query_scripts(|script| &script.id == id).into_iter().next()
    }

    pub fn find_by_name(&self, name: &str) -> Option<Script> {
        self.query_scripts(|script| script.name == name)
            .into_iter()
            .next()
    }

    pub fn scripts_with_tag(&self, tag: &str) -> Vec<Script> {
        self.query_scripts(|script| script.has_tag(tag))
    }

    /// Pinned scripts first, then alphabetical.
    pub fn sorted_for_display(&self) -> Vec<Script> {
        let mut scripts = self.scripts();
        scripts.sort_by(|a, b| b.is_pinned.cmp(&a.is_pinned).then_with(|| a.name.cmp(&b.name)));
        scripts
    }

    /// Record a run on a copy of `script`. The model itself is not changed;
    /// pass the result to [`edit_script`](Self::edit_script) to keep it.
    pub fn get_add_run_script_info(
        &self,
        script: &Script,
        log_path: Option<std::path::PathBuf>,
    ) -> Script {
        let now = Utc::now();
        let mut updated = script.clone();
        updated.last_run = Some(now);
        if let Some(filepath) = log_path {
            updated.logs.push(ScriptLog {
                filepath,
                created_at: now,
            });
        }
        updated
    }

    #[instrument(name = "delete_script", skip(self), fields(id = %id))]
    pub fn delete_script_by_id(&self, id: &ScriptId) -> Option<Script> {
        let Some(removed) = self.get_script_by_id(id) else {
            info!("Script not found, nothing deleted");
            return None;
        };
        let scripts = self
            .scripts()
            .into_iter()
            .filter(|script| &script.id != id)
            .collect();
        self.set_scripts(scripts);
        info!(name = %removed.name, "Deleted script");
        Some(removed)
    }
}
