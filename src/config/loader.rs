//! Configuration loading from the environment and file system

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_FILE_NAME, DEFAULT_ROOT_DIR_NAME, ROOT_FOLDER_ENV};
use super::types::Config;

/// Pick the root folder: explicit flag, then `$ROOT_FOLDER`, then `~/.global_scripts_manager`.
///
/// Tilde in the flag or the variable is expanded.
pub fn resolve_root(flag: Option<&Path>) -> PathBuf {
    root_from(
        flag,
        std::env::var(ROOT_FOLDER_ENV).ok(),
        dirs::home_dir(),
    )
}

pub(crate) fn root_from(
    flag: Option<&Path>,
    env_value: Option<String>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(flag) = flag {
        return expand(&flag.to_string_lossy());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return expand(&value);
    }
    home.unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_ROOT_DIR_NAME)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load `<root>/config.json`.
///
/// Returns defaults (with `root`) if the file is missing or invalid.
#[instrument(name = "load_config", skip(root), fields(root = %root.display()))]
pub fn load_config_from(root: PathBuf) -> Config {
    let config_path = root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::with_root(root);
    }

    let parsed = std::fs::read_to_string(&config_path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Config>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(mut config) => {
            config.root = root;
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to load config, using defaults"
            );
            Config::with_root(root)
        }
    }
}
