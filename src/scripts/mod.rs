//! Scripts module - Script records, paths, the in-memory model and persistence
//!
//! This module provides functionality for:
//! - Deriving where a script, its logs and the metadata document live
//! - Holding the script collection in memory and notifying subscribers on change
//! - Saving and loading the collection as one JSON document
//!
//! # Module Structure
//!
//! - `types` - Core data types (Script, ScriptPatch, ScriptChange, etc.)
//! - `paths` - Pure path derivation
//! - `model` - The reactive in-memory collection
//! - `store` - JSON document persistence and the tag registry

mod model;
mod paths;
mod store;
mod types;

pub use model::{validate_script_name, ScriptsModel};
pub use paths::{PathsHandler, LOGS_DIR, SCRIPTS_DIR, SCRIPTS_JSON_FILE};
pub use store::{DocumentMetadata, ScriptsDocument, ScriptsJsonHandler};
pub use types::{NewScript, Script, ScriptChange, ScriptField, ScriptId, ScriptLog, ScriptPatch};
