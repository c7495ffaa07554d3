//! Guarded file and folder operations
//!
//! Removal is a no-op when the target is already gone. Operations that need an
//! existing source fail with [`ScriptsError::NotFound`] instead of a raw I/O error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{Result, ScriptsError};

/// Body of a freshly created script
pub const SCRIPT_TEMPLATE: &str = "#!/bin/bash\n\necho 'hello'";

pub struct FileManager;

impl FileManager {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    fn require(path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(ScriptsError::NotFound(path.to_path_buf()))
        }
    }

    pub fn remove_file(path: &Path) -> Result<()> {
        if Self::exists(path) {
            fs::remove_file(path).map_err(|e| ScriptsError::io(path, e))?;
            debug!(path = %path.display(), "Removed file");
        }
        Ok(())
    }

    pub fn remove_directory(path: &Path) -> Result<()> {
        if Self::exists(path) {
            fs::remove_dir_all(path).map_err(|e| ScriptsError::io(path, e))?;
            debug!(path = %path.display(), "Removed directory");
        }
        Ok(())
    }

    pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
        Self::require(from)?;
        fs::rename(from, to).map_err(|e| ScriptsError::io(from, e))
    }

    /// Write `content` to `path`. An existing file is replaced only with `overwrite`.
    pub fn create_file(path: &Path, content: &str, overwrite: bool) -> Result<()> {
        if Self::exists(path) && !overwrite {
            return Err(ScriptsError::Validation(format!(
                "File already exists: {}",
                path.display()
            )));
        }
        fs::write(path, content).map_err(|e| ScriptsError::io(path, e))
    }

    /// Create `path` and its parents. With `overwrite`, an existing directory is emptied first.
    pub fn create_directory(path: &Path, overwrite: bool) -> Result<()> {
        if Self::exists(path) && overwrite {
            fs::remove_dir_all(path).map_err(|e| ScriptsError::io(path, e))?;
        }
        fs::create_dir_all(path).map_err(|e| ScriptsError::io(path, e))
    }

    pub fn upsert_folder(path: &Path) -> Result<()> {
        Self::create_directory(path, false)
    }

    pub fn read_file(path: &Path) -> Result<String> {
        Self::require(path)?;
        fs::read_to_string(path).map_err(|e| ScriptsError::io(path, e))
    }

    fn entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
        Self::require(dir)?;
        fs::read_dir(dir)
            .map_err(|e| ScriptsError::io(dir, e))?
            .map(|entry| entry.map_err(|e| ScriptsError::io(dir, e)))
            .collect()
    }

    /// Names of the regular files directly inside `dir`, sorted
    pub fn list_files(dir: &Path) -> Result<Vec<String>> {
        let mut names: Vec<String> = Self::entries(dir)?
            .into_iter()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Names of the directories directly inside `dir`, sorted
    pub fn list_directories(dir: &Path) -> Result<Vec<String>> {
        let mut names: Vec<String> = Self::entries(dir)?
            .into_iter()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
        Self::require(from)?;
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| ScriptsError::io(from, e))
    }

    pub fn move_file(from: &Path, to: &Path) -> Result<()> {
        Self::rename_file(from, to)
    }

    pub fn file_size(path: &Path) -> Result<u64> {
        Self::require(path)?;
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| ScriptsError::io(path, e))
    }
}

/// Write the starter script at `path` and mark it executable.
#[instrument(name = "create_bash_file", fields(path = %path.display()))]
pub fn create_bash_file(path: &Path) -> Result<PathBuf> {
    fs::write(path, SCRIPT_TEMPLATE).map_err(|e| ScriptsError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| ScriptsError::io(path, e))?;
    }

    info!("Created script file");
    Ok(path.to_path_buf())
}
