//! moxlaunch CLI - Command-line interface
//!
//! Provisions Git, the Python environment and the agent before the desktop
//! application starts. Running without a subcommand is the same as `run`.

mod commands;
mod error;

use clap::{Parser, Subcommand};

use commands::common::GlobalArgs;

#[derive(Parser)]
#[command(name = "moxlaunch")]
#[command(version, about = "Install and update the application's portable dependencies", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring every resource up to its required version (default)
    Run,
    /// Show installed and required versions without changing anything
    Status,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cli.global),
        Commands::Status => commands::status::run(&cli.global),
        Commands::Init { force } => commands::init::run(&cli.global, force),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["moxlaunch", "status", "--data-dir", "/tmp/x", "--no-resume"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
        assert_eq!(cli.global.data_dir.as_deref(), Some(std::path::Path::new("/tmp/x")));
        assert!(cli.global.no_resume);
    }

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["moxlaunch", "-v"]);
        assert!(cli.command.is_none());
        assert!(cli.global.verbose);
    }
}
