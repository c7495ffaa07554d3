//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gsm")]
#[command(about = "Create, organize and run your shell scripts")]
#[command(version)]
pub struct Cli {
    /// Root folder for scripts, logs and scripts.json (overrides $ROOT_FOLDER)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute. Without one the interactive menu starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the saved scripts
    List {
        /// Only scripts carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Print the JSON summary only
        #[arg(long)]
        json: bool,
    },
    /// Print the root folder, scripts folder and document path
    Paths,
    /// Run a script by name and record the run
    Run {
        /// Script name
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_starts_menu() {
        let cli = Cli::try_parse_from(["gsm"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.root.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_list_with_flags() {
        let cli = Cli::try_parse_from(["gsm", "list", "--tag", "git", "--json", "--root", "/tmp/r"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::List {
                tag: Some("git".into()),
                json: true
            })
        );
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/r")));
    }

    #[test]
    fn test_run_requires_name() {
        assert!(Cli::try_parse_from(["gsm", "run"]).is_err());
        let cli = Cli::try_parse_from(["gsm", "-v", "run", "deploy"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Command::Run { name: "deploy".into() }));
    }
}
