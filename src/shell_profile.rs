//! PATH registration through the user's shell profile
//!
//! A global script's folder is added to PATH by appending
//! `export PATH="$PATH:<folder>"` to `~/.zshrc`, `~/.bashrc` or `~/.profile`,
//! and removed again by deleting that exact line.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::error::{Result, ScriptsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProfile {
    path: PathBuf,
}

impl ShellProfile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ShellProfile { path: path.into() }
    }

    /// Pick the profile file for `shell` (usually `$SHELL`).
    pub fn detect(shell: Option<&str>, home: &Path) -> Self {
        let shell = shell.unwrap_or_default();
        let file = if shell.contains("zsh") {
            ".zshrc"
        } else if shell.contains("bash") {
            ".bashrc"
        } else {
            ".profile"
        };
        Self::new(home.join(file))
    }

    /// Profile for `shell` in the current user's home directory.
    pub fn for_current_user(shell: Option<&str>) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScriptsError::Config("Could not determine home directory".into()))?;
        Ok(Self::detect(shell, &home))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export_line(folder: &Path) -> String {
        format!("export PATH=\"$PATH:{}\"", folder.display())
    }

    /// A missing profile reads as empty; it is created on first write.
    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Shell profile not found, it will be created");
                Ok(String::new())
            }
            Err(e) => Err(ScriptsError::io(&self.path, e)),
        }
    }

    pub fn contains_folder(&self, folder: &Path) -> Result<bool> {
        let line = Self::export_line(folder);
        Ok(self.read()?.lines().any(|l| l.trim() == line))
    }

    /// Append the export line for `folder`. Returns false when it was already there.
    #[instrument(name = "add_to_path", skip(self), fields(profile = %self.path.display()))]
    pub fn add_folder(&self, folder: &Path) -> Result<bool> {
        let content = self.read()?;
        let line = Self::export_line(folder);

        if content.lines().any(|l| l.trim() == line) {
            info!(folder = %folder.display(), "Folder already in PATH");
            return Ok(false);
        }

        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&line);
        updated.push('\n');
        fs::write(&self.path, updated).map_err(|e| ScriptsError::io(&self.path, e))?;

        info!(folder = %folder.display(), "Added folder to PATH");
        Ok(true)
    }

    /// Remove the first export line for `folder`. Returns false when it wasn't there.
    #[instrument(name = "remove_from_path", skip(self), fields(profile = %self.path.display()))]
    pub fn remove_folder(&self, folder: &Path) -> Result<bool> {
        let content = self.read()?;
        let line = Self::export_line(folder);

        let mut removed = false;
        let kept: Vec<&str> = content
            .split_inclusive('\n')
            .filter(|l| {
                if !removed && l.trim() == line {
                    removed = true;
                    false
                } else {
                    true
                }
            })
            .collect();

        if !removed {
            info!(folder = %folder.display(), "Folder not found in PATH");
            return Ok(false);
        }

        fs::write(&self.path, kept.concat()).map_err(|e| ScriptsError::io(&self.path, e))?;
        info!(folder = %folder.display(), "Removed folder from PATH");
        Ok(true)
    }
}
