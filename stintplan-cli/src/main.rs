//! Stintplan CLI - Command-line interface
//!
//! Runs the pit stop strategy search and manages the configuration file.

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use stintplan::logging::{init_logging, LoggingConfig};

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "stintplan")]
#[command(version, about = "Enumerate and rank pit stop strategies for a fixed-length race")]
struct Cli {
    /// Also write log output to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log debug output from the search
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for strategies and print the fastest ones
    Run(RunArgs),

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut logging = LoggingConfig::default().with_ansi(console::colors_enabled_stderr());
    if cli.verbose {
        logging = logging.with_default_filter("stintplan=debug");
    }
    if let Some(path) = cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = init_logging(&logging)?;

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { command } => commands::config::run(command),
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
        let cli = Cli::try_parse_from(["stintplan", "run", "--log-file", "out.log", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("out.log")));
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_config_subcommand_parses() {
        let cli = Cli::try_parse_from(["stintplan", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Path
            }
        ));
    }
}
