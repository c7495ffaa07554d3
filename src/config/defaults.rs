//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Environment variable that overrides the root folder
pub const ROOT_FOLDER_ENV: &str = "ROOT_FOLDER";

/// Root folder name under the home directory when nothing overrides it
pub const DEFAULT_ROOT_DIR_NAME: &str = ".global_scripts_manager";

/// Optional settings file inside the root folder
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Editor used when neither the config nor $EDITOR names one
pub const DEFAULT_EDITOR: &str = "vi";

/// Text streamer pacing
pub const DEFAULT_STREAM_DELAY_MS: u64 = 15;
pub const DEFAULT_CHUNK_SIZE: usize = 1;

/// Spinners and streamed text are on by default
pub const DEFAULT_ANIMATIONS: bool = true;

/// JSONL application log inside `<root>/logs/`
pub const APP_LOG_FILE_NAME: &str = "gsm.jsonl";
