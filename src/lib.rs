//! Global Scripts Manager - create, tag, run and organize shell scripts
//!
//! Scripts live under one root folder together with `scripts.json`, which
//! records every script's name, tags, PATH registration and run history.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod logging;
pub mod process;
pub mod reactive;
pub mod scripts;
pub mod shell_profile;
pub mod tags;
pub mod ui;
