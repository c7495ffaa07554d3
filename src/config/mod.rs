//! Configuration module - Root folder resolution and user preferences
//!
//! This module provides functionality for:
//! - Resolving the root folder (flag, `$ROOT_FOLDER`, or `~/.global_scripts_manager`)
//! - Loading optional settings from `<root>/config.json`
//! - Default values for all settings
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - The Config struct and its accessors
//! - `loader` - Environment and file system loading

mod defaults;
mod loader;
mod types;

pub use defaults::{APP_LOG_FILE_NAME, DEFAULT_ROOT_DIR_NAME, ROOT_FOLDER_ENV};

pub use types::Config;

pub use loader::{load_config_from, resolve_root};

#[cfg(test)]
pub use defaults::{DEFAULT_CHUNK_SIZE, DEFAULT_EDITOR, DEFAULT_STREAM_DELAY_MS};

#[cfg(test)]
pub(crate) use loader::root_from;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
