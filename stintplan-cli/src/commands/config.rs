//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init` for locating,
//! inspecting, and creating the configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use stintplan::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show {
        /// Configuration file to read instead of the default
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show { config } => run_show(config.as_deref()),
        ConfigCommands::Init { force } => run_init(&config_file_path(), force),
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    let path = config_file_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist, defaults are in use)");
    }
    Ok(())
}

/// Print the configuration the run command would use.
fn run_show(path: Option<&Path>) -> Result<(), CliError> {
    let (config, source) = match path {
        Some(path) => (ConfigFile::load_from(path)?, path.to_path_buf()),
        None => (ConfigFile::load()?, config_file_path()),
    };

    println!("# Source: {}", source.display());
    if !source.exists() {
        println!("# (file not found, showing defaults)");
    }
    println!();
    print!("{}", config.to_ini_string());
    Ok(())
}

/// Write the default configuration to `path`.
fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            path.display()
        )));
    }

    ConfigFile::default().save_to(path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize race parameters and compounds.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
