use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use global_scripts_manager::app::{self, App};
use global_scripts_manager::cli::{Cli, Command};
use global_scripts_manager::config::Config;
use global_scripts_manager::logging;
use global_scripts_manager::scripts::{ScriptsJsonHandler, ScriptsModel};
use global_scripts_manager::shell_profile::ShellProfile;
use global_scripts_manager::ui::TerminalPrompter;

fn main() {
    if let Err(e) = try_main() {
        error!(error = ?e, "gsm failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let (config, _guard) = logging::init_with_config(cli.root.as_deref(), cli.verbose);
    info!(root = %config.root().display(), command = ?cli.command, "Starting");

    match cli.command {
        Some(Command::Paths) => {
            print_paths(&config);
            Ok(())
        }
        Some(Command::List { tag, json }) => list(&config, tag.as_deref(), json),
        Some(Command::Run { name }) => {
            let mut app = build_app(config)?;
            app.run_script_by_name(&name)
                .with_context(|| format!("Failed to run script '{name}'"))?;
            Ok(())
        }
        None => {
            let mut app = build_app(config)?;
            app.run_menu().context("Interactive session ended with an error")
        }
    }
}

fn build_app(config: Config) -> Result<App<TerminalPrompter>> {
    let profile = ShellProfile::for_current_user(config.get_shell().as_deref())
        .context("Failed to locate the shell profile")?;
    Ok(App::new(config, profile, TerminalPrompter))
}

fn print_paths(config: &Config) {
    let paths = config.paths();
    println!("root:    {}", config.root().display());
    println!("scripts: {}", paths.scripts_root().display());
    println!("json:    {}", paths.json_file_path().display());
    println!("logs:    {}", paths.logs_root().display());
}

/// Read-only, so no shell profile is needed.
fn list(config: &Config, tag: Option<&str>, json: bool) -> Result<()> {
    let paths = config.paths();
    let mut store = ScriptsJsonHandler::new(paths.clone());
    let model = ScriptsModel::new(paths, store.load_or_empty());
    if json {
        println!(
            "{}",
            app::summary_json(&model, tag).context("Failed to render script list")?
        );
        return Ok(());
    }
    if model.is_empty() {
        println!("No scripts found.");
        return Ok(());
    }
    let tags: Vec<&str> = store.tags().iter().map(String::as_str).collect();
    println!("all tags: {}", tags.join(", "));
    for row in app::summarize(&model, tag) {
        let pin = if row.pinned { "*" } else { " " };
        println!(
            "{pin} {:<24} {:<6} [{}] {}",
            row.name, row.is_global, row.tags, row.filepath
        );
    }
    Ok(())
}
