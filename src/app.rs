//! Interactive flows behind the main menu
//!
//! Every flow follows the same order: ask, change files on disk, update the
//! model, then save the document. Cleanup that can't complete (stale logs, a
//! PATH line that is already gone) is logged and the flow carries on.

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::{ErrorSeverity, Result, ResultExt, ScriptsError};
use crate::file_manager::{create_bash_file, FileManager};
use crate::logging::log_script_event;
use crate::process::{is_available, run_executable, RunOptions};
use crate::reactive::{Effect, StateManager};
use crate::scripts::{
    validate_script_name, NewScript, Script, ScriptChange, ScriptField, ScriptPatch,
    ScriptsJsonHandler, ScriptsModel,
};
use crate::shell_profile::ShellProfile;
use crate::tags::parse_tags;
use crate::ui::{print_banner, Prompter, Spinner, TextStreamer};

pub const APP_TITLE: &str = "Global Scripts Manager";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Create,
    Delete,
    Edit,
    List,
    Run,
    Copy,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::Create,
        MenuAction::Delete,
        MenuAction::Edit,
        MenuAction::List,
        MenuAction::Run,
        MenuAction::Copy,
        MenuAction::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Create => "create script",
            MenuAction::Delete => "delete script",
            MenuAction::Edit => "edit script",
            MenuAction::List => "list scripts",
            MenuAction::Run => "run script",
            MenuAction::Copy => "copy script to clipboard",
            MenuAction::Quit => "quit",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    Name,
    Tags,
    TogglePath,
    TogglePin,
    Schedule,
    OpenInEditor,
    Save,
}

impl EditAction {
    const ALL: [EditAction; 7] = [
        EditAction::Name,
        EditAction::Tags,
        EditAction::TogglePath,
        EditAction::TogglePin,
        EditAction::Schedule,
        EditAction::OpenInEditor,
        EditAction::Save,
    ];

    fn label(self, script: &Script) -> String {
        match self {
            EditAction::Name => "edit name".into(),
            EditAction::Tags => "edit tags".into(),
            EditAction::TogglePath if script.is_global => "remove from path".into(),
            EditAction::TogglePath => "add to path".into(),
            EditAction::TogglePin if script.is_pinned => "unpin".into(),
            EditAction::TogglePin => "pin".into(),
            EditAction::Schedule => "edit schedule".into(),
            EditAction::OpenInEditor => "open in editor".into(),
            EditAction::Save => "save changes".into(),
        }
    }
}

/// One row of `list` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSummary {
    pub name: String,
    pub tags: String,
    /// `global` or `local`
    pub is_global: &'static str,
    pub filepath: String,
    pub pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl From<&Script> for ScriptSummary {
    fn from(script: &Script) -> Self {
        ScriptSummary {
            name: script.name.clone(),
            tags: script.tags.join(", "),
            is_global: if script.is_global { "global" } else { "local" },
            filepath: script.filepath.display().to_string(),
            pinned: script.is_pinned,
            schedule: script.schedule.clone(),
            last_run: script.last_run,
        }
    }
}

/// Summary rows, pinned first, optionally only those with `tag`.
pub fn summarize(model: &ScriptsModel, tag: Option<&str>) -> Vec<ScriptSummary> {
    model
        .sorted_for_display()
        .iter()
        .filter(|script| tag.map_or(true, |t| script.has_tag(t)))
        .map(ScriptSummary::from)
        .collect()
}

pub fn summary_json(model: &ScriptsModel, tag: Option<&str>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&summarize(model, tag))?)
}

/// Check a cron expression. Blank input clears the schedule.
pub fn validate_schedule(input: &str) -> Result<Option<String>> {
    let expr = input.trim();
    if expr.is_empty() {
        return Ok(None);
    }
    Cron::from_str(expr).map_err(|e| {
        ScriptsError::Validation(format!("Invalid cron expression '{}': {}", expr, e))
    })?;
    Ok(Some(expr.to_string()))
}

pub struct App<P: Prompter> {
    config: Config,
    model: ScriptsModel,
    store: ScriptsJsonHandler,
    profile: ShellProfile,
    prompter: P,
    streamer: TextStreamer,
    _change_log: Effect,
}

impl<P: Prompter> App<P> {
    /// Load the document under the configured root and build the model from it.
    pub fn new(config: Config, profile: ShellProfile, prompter: P) -> Self {
        let paths = config.paths();
        let mut store = ScriptsJsonHandler::new(paths.clone());
        let scripts = store.load_or_empty();
        let model = ScriptsModel::new(paths, scripts);

        let change_log = model.on_scripts_change(|scripts| {
            debug!(
                count = scripts.len(),
                global = scripts.iter().filter(|s| s.is_global).count(),
                "Scripts changed"
            );
        });

        let streamer = if config.animations_enabled() {
            TextStreamer::new(
                Duration::from_millis(config.get_stream_delay_ms()),
                config.get_chunk_size(),
            )
        } else {
            TextStreamer::instant()
        };

        App {
            config,
            model,
            store,
            profile,
            prompter,
            streamer,
            _change_log: change_log,
        }
    }

    fn say(&self, text: &str) {
        self.streamer.println(text).warn_on_err();
    }

    fn spinner(&self, message: &str) -> Spinner {
        Spinner::start(message, self.config.animations_enabled())
    }

    /// Write the collection and tag registry to disk.
    pub fn save(&self) -> Result<()> {
        let spinner = self.spinner("Saving scripts...");
        match self.store.write_scripts_to_file(&self.model.scripts()) {
            Ok(()) => {
                spinner.succeed("Scripts saved");
                Ok(())
            }
            Err(e) => {
                spinner.fail("Could not save scripts");
                Err(e)
            }
        }
    }

    /// Show the main menu until the user confirms quitting.
    pub fn run_menu(&mut self) -> Result<()> {
        if self.config.animations_enabled() {
            print_banner(APP_TITLE);
        }
        self.say("Welcome to Global Scripts Manager. What would you like to do with your scripts today?");

        let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.to_string()).collect();
        loop {
            let action = match self.prompter.select("Choose an action:", &labels, Some(0))? {
                Some(index) => MenuAction::ALL[index],
                None => MenuAction::Quit,
            };

            if action == MenuAction::Quit {
                if self.prompter.confirm("Are you sure you want to quit?")? {
                    self.say("Goodbye!");
                    info!(event_type = "app_lifecycle", action = "quit", "User quit");
                    return Ok(());
                }
                continue;
            }

            if let Err(e) = self.dispatch(action) {
                if matches!(e, ScriptsError::Prompt(_)) {
                    return Err(e);
                }
                match e.severity() {
                    ErrorSeverity::Info | ErrorSeverity::Warning => {
                        warn!(error = %e, action = %action, "Action stopped")
                    }
                    ErrorSeverity::Error | ErrorSeverity::Critical => {
                        error!(error = %e, action = %action, "Action failed")
                    }
                }
                self.say(&e.user_message());
            }
        }
    }

    fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::Create => self.create_script().map(|_| ()),
            MenuAction::Delete => self.delete_script().map(|_| ()),
            MenuAction::Edit => self.edit_script().map(|_| ()),
            MenuAction::List => {
                self.print_list(None);
                Ok(())
            }
            MenuAction::Run => self.run_script_flow().map(|_| ()),
            MenuAction::Copy => self.copy_script_to_clipboard(),
            MenuAction::Quit => Ok(()),
        }
    }

    /// Pick a script by name, pinned first. `None` when there are none or the user backs out.
    fn choose_script(&self, message: &str) -> Result<Option<Script>> {
        let scripts = self.model.sorted_for_display();
        if scripts.is_empty() {
            self.say("No scripts found.");
            return Ok(None);
        }
        let names: Vec<String> = scripts.iter().map(|s| s.name.clone()).collect();
        Ok(self
            .prompter
            .select(message, &names, Some(0))?
            .and_then(|index| scripts.into_iter().nth(index)))
    }

    /// Ask until the name is valid and not taken.
    fn ask_script_name(&self, message: &str) -> Result<String> {
        loop {
            let name = self.prompter.input(message, true)?;
            let checked = validate_script_name(&name).and_then(|()| {
                if self.model.is_script_name_unique(&name) {
                    Ok(())
                } else {
                    Err(ScriptsError::DuplicateName(name.clone()))
                }
            });
            match checked {
                Ok(()) => return Ok(name),
                Err(e) if e.is_retryable() => self.say(&e.user_message()),
                Err(e) => return Err(e),
            }
        }
    }

    #[instrument(name = "create_script_flow", skip(self))]
    pub fn create_script(&mut self) -> Result<Option<Script>> {
        let name = self.ask_script_name("What should the script name be? (letters, digits, - and _)")?;

        let tags = if self.prompter.confirm("Do you want to add any tags to the script?")? {
            parse_tags(&self.prompter.input("Type in a comma separated list of tags:", false)?)
        } else {
            Vec::new()
        };
        self.store.add_tags(tags.iter().cloned());

        let script = self.model.add_script(NewScript::named(name).with_tags(tags))?;
        let folder = self.model.paths().folder_for_script(&script);

        let spinner = self.spinner("Creating script...");
        let created = FileManager::upsert_folder(&folder)
            .and_then(|()| create_bash_file(&script.filepath));
        if let Err(e) = created {
            spinner.fail("Could not create the script file");
            self.model.delete_script_by_id(&script.id);
            return Err(e);
        }
        spinner.succeed(format!("Created {}", script.filepath.display()));

        let mut script = script;
        if self.prompter.confirm("Do you want to add the script to your PATH?")? {
            let spinner = self.spinner("Adding to PATH...");
            match self.profile.add_folder(&folder) {
                Ok(_) => {
                    script = self
                        .model
                        .edit_script(&script, ScriptPatch::new().is_global(true))?;
                    spinner.succeed("Added to PATH");
                }
                Err(e) => {
                    error!(error = %e, folder = %folder.display(), "Error adding to PATH");
                    spinner.fail("Error adding to PATH");
                }
            }
        }

        self.save()?;
        info!(id = %script.id, name = %script.name, "Script created");
        Ok(Some(script))
    }

    #[instrument(name = "delete_script_flow", skip(self))]
    pub fn delete_script(&mut self) -> Result<Option<Script>> {
        let Some(script) = self.choose_script("Select a script to delete:")? else {
            return Ok(None);
        };

        let delete_logs = self.prompter.confirm("Delete all logs for this script?")?;
        let delete_files = self
            .prompter
            .confirm("Delete the script file and folder as well?")?;

        let paths = self.model.paths().clone();
        let folder = paths.folder_for_script(&script);

        if script.is_global {
            let spinner = self.spinner("Removing from PATH...");
            match self.profile.remove_folder(&folder) {
                Ok(_) => spinner.succeed("Removed from PATH"),
                Err(e) => {
                    error!(error = %e, folder = %folder.display(), "Error removing from PATH");
                    spinner.fail("Error removing from PATH");
                }
            }
        }

        if delete_logs {
            for log in &script.logs {
                FileManager::remove_file(&log.filepath).log_err();
            }
            FileManager::remove_directory(&paths.log_folder_for_script(&script)).log_err();
        } else {
            info!("User chose not to delete the logs");
        }

        if delete_files {
            FileManager::remove_directory(&folder).log_err();
        } else {
            info!("User chose not to delete the script file");
        }

        let Some(deleted) = self.model.delete_script_by_id(&script.id) else {
            warn!(id = %script.id, "Script vanished before it could be deleted");
            return Ok(None);
        };
        self.save()?;
        self.say(&format!("Deleted script: {}", deleted.name));
        Ok(Some(deleted))
    }

    /// Apply `change` to the model, then to the working copy.
    fn commit(&self, working: &mut StateManager<Script>, change: ScriptChange) -> Result<()> {
        self.model
            .edit_script(working.state(), ScriptPatch::from(change.clone()))?;
        working.set(change);
        Ok(())
    }

    #[instrument(name = "edit_script_flow", skip(self))]
    pub fn edit_script(&mut self) -> Result<Option<Script>> {
        let Some(script) = self.choose_script("Select a script to edit:")? else {
            return Ok(None);
        };
        self.say(&format!("Editing script at path: {}", script.filepath.display()));

        let added_tags: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut working = StateManager::new(script);
        {
            let added_tags = Rc::clone(&added_tags);
            working.on_change(ScriptField::Tags, move |change| {
                if let ScriptChange::Tags(tags) = change {
                    added_tags.borrow_mut().extend(tags.iter().cloned());
                }
            });
        }
        working.on_change(ScriptField::Name, |change| {
            if let ScriptChange::Rename { name, filepath } = change {
                info!(new_name = %name, filepath = %filepath.display(), "Script renamed");
            }
        });

        loop {
            let labels: Vec<String> = EditAction::ALL
                .iter()
                .map(|a| a.label(working.state()))
                .collect();
            let action = match self.prompter.select("Choose an action:", &labels, Some(0))? {
                Some(index) => EditAction::ALL[index],
                None => EditAction::Save,
            };

            match action {
                EditAction::Name => self.edit_name(&mut working)?,
                EditAction::Tags => self.edit_tags(&mut working)?,
                EditAction::TogglePath => self.toggle_path(&mut working)?,
                EditAction::TogglePin => {
                    let pinned = !working.state().is_pinned;
                    self.commit(&mut working, ScriptChange::IsPinned(pinned))?;
                }
                EditAction::Schedule => self.edit_schedule(&mut working)?,
                EditAction::OpenInEditor => {
                    if let Err(e) = self.open_in_editor(&working.state().filepath) {
                        error!(error = %e, "Could not open editor");
                        self.say(&e.user_message());
                    }
                }
                EditAction::Save => break,
            }

            let tags = std::mem::take(&mut *added_tags.borrow_mut());
            self.store.add_tags(tags);
        }

        self.save()?;
        Ok(Some(working.into_state()))
    }

    fn edit_name(&self, working: &mut StateManager<Script>) -> Result<()> {
        let name = self.prompter.input("What should the new name be?", false)?;
        if name.is_empty() {
            return Ok(());
        }
        if let Err(e) = validate_script_name(&name) {
            self.say(&e.user_message());
            return Ok(());
        }
        if !self.model.is_script_name_unique(&name) {
            self.say(&ScriptsError::DuplicateName(name).user_message());
            return Ok(());
        }

        let current = working.state();
        let filepath = self.model.paths().folder_for_script(current).join(&name);
        let spinner = self.spinner("Renaming file...");
        if let Err(e) = FileManager::rename_file(&current.filepath, &filepath) {
            error!(error = %e, "Couldn't rename script file");
            spinner.fail("Whoops, couldn't rename file");
            return Ok(());
        }
        self.commit(working, ScriptChange::Rename { name, filepath })?;
        spinner.succeed("Renamed");
        Ok(())
    }

    fn edit_tags(&self, working: &mut StateManager<Script>) -> Result<()> {
        if !self.prompter.confirm("Do you want to edit your tags?")? {
            return Ok(());
        }
        let message = format!("Edit your tags (old: {}):", working.state().tags.join(", "));
        let tags = parse_tags(&self.prompter.input(&message, false)?);
        if tags.is_empty() {
            return Ok(());
        }
        self.commit(working, ScriptChange::Tags(tags))
    }

    fn toggle_path(&self, working: &mut StateManager<Script>) -> Result<()> {
        let is_global = working.state().is_global;
        let question = if is_global {
            "Remove from PATH?"
        } else {
            "Add to PATH?"
        };
        if !self.prompter.confirm(question)? {
            return Ok(());
        }

        let folder = self.model.paths().folder_for_script(working.state());
        let spinner = self.spinner(if is_global {
            "Removing from PATH..."
        } else {
            "Adding to PATH..."
        });
        let updated = if is_global {
            self.profile.remove_folder(&folder)
        } else {
            self.profile.add_folder(&folder)
        };
        match updated {
            Ok(_) => {
                self.commit(working, ScriptChange::IsGlobal(!is_global))?;
                spinner.succeed("PATH updated");
            }
            Err(e) => {
                error!(error = %e, folder = %folder.display(), "Error updating PATH");
                spinner.fail("Error updating PATH");
            }
        }
        Ok(())
    }

    fn edit_schedule(&self, working: &mut StateManager<Script>) -> Result<()> {
        let current = working.state().schedule.clone().unwrap_or_default();
        let message = format!("Cron schedule (current: '{}', blank clears):", current);
        let input = self.prompter.input(&message, false)?;
        match validate_schedule(&input) {
            Ok(schedule) => self.commit(working, ScriptChange::Schedule(schedule)),
            Err(e) => {
                self.say(&e.user_message());
                Ok(())
            }
        }
    }

    /// Open `path` in the configured editor and wait for it to exit.
    #[instrument(name = "open_in_editor", skip(self), fields(path = %path.display()))]
    pub fn open_in_editor(&self, path: &Path) -> Result<()> {
        let editor = self.config.get_editor();
        if !is_available(&editor) {
            return Err(ScriptsError::ProcessSpawn(format!(
                "editor '{}' was not found on PATH",
                editor
            )));
        }
        info!(editor = %editor, "Opening file in editor");

        let status = Command::new(&editor)
            .arg(path)
            .status()
            .map_err(|e| ScriptsError::ProcessSpawn(format!("{editor}: {e}")))?;
        if !status.success() {
            warn!(editor = %editor, status = ?status.code(), "Editor exited with an error");
        }
        Ok(())
    }

    pub fn list_summary(&self, tag: Option<&str>) -> Vec<ScriptSummary> {
        summarize(&self.model, tag)
    }

    pub fn list_json(&self, tag: Option<&str>) -> Result<String> {
        summary_json(&self.model, tag)
    }

    pub fn print_list(&self, tag: Option<&str>) {
        let tags: Vec<&str> = self.store.tags().iter().map(String::as_str).collect();
        println!("{} {:?}", yansi::Paint::green("all tags:").bold(), tags);
        match self.list_json(tag) {
            Ok(json) => println!("{}", json),
            Err(e) => error!(error = %e, "Could not render script list"),
        }
    }

    /// Run `script`, keep its output as a log file and record the run.
    #[instrument(name = "run_script", skip(self, script), fields(name = %script.name, id = %script.id))]
    pub fn run_script(&mut self, script: &Script) -> Result<Script> {
        let paths = self.model.paths().clone();
        let log_path = paths.log_path_for_run(script, Utc::now());
        let spinner = self.spinner(&format!("Running {}...", script.name));

        let options = RunOptions::quiet().in_dir(paths.folder_for_script(script));
        let (output, duration_ms, success) =
            match run_executable(&script.filepath, &[], &options) {
                Ok(out) => (out.combined(), Some(out.duration_ms), true),
                Err(ScriptsError::Command { stderr, .. }) => (stderr, None, false),
                Err(e) => {
                    spinner.fail(format!("Could not start {}", script.name));
                    log_script_event(script.id.as_str(), "run", None, false);
                    return Err(e);
                }
            };
        log_script_event(script.id.as_str(), "run", duration_ms, success);

        FileManager::upsert_folder(&paths.log_folder_for_script(script))?;
        FileManager::create_file(&log_path, &output, true)?;

        let ran = self.model.get_add_run_script_info(script, Some(log_path.clone()));
        let updated = self
            .model
            .edit_script(script, ScriptPatch::from_script(&ran))?;
        if success {
            spinner.succeed(format!("{} finished", script.name));
        } else {
            spinner.fail(format!("{} failed", script.name));
        }

        self.save()?;
        if !output.is_empty() {
            println!("{}", output.trim_end());
        }
        info!(log = %log_path.display(), success, "Run recorded");
        Ok(updated)
    }

    pub fn run_script_by_name(&mut self, name: &str) -> Result<Script> {
        let script = self
            .model
            .find_by_name(name)
            .ok_or_else(|| ScriptsError::UnknownScript(name.to_string()))?;
        self.run_script(&script)
    }

    fn run_script_flow(&mut self) -> Result<Option<Script>> {
        let Some(script) = self.choose_script("Select a script to run:")? else {
            return Ok(None);
        };
        self.run_script(&script).map(Some)
    }

    /// Content of the script file, as copied to the clipboard
    pub fn script_content(&self, script: &Script) -> Result<String> {
        FileManager::read_file(&script.filepath)
    }

    fn copy_script_to_clipboard(&mut self) -> Result<()> {
        let Some(script) = self.choose_script("Select a script to copy:")? else {
            return Ok(());
        };
        let content = self.script_content(&script)?;
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(content))
            .map_err(|e| ScriptsError::Clipboard(e.to_string()))?;
        self.say("Script copied to clipboard");
        Ok(())
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
