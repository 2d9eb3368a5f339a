//! jconfig CLI library
//!
//! This library contains all the CLI logic for jconfig, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod repos;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jconfig_config::{Settings, settings::SETTINGS_ENV};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// jconfig - Kconfig-style configuration driven by JSON schemas
#[derive(Parser)]
#[command(name = "jconfig")]
#[command(about = "Configure make-based projects from JSON schemas")]
#[command(version)]
#[command(long_about = "Configure make-based projects from JSON schemas

Walks a tree of config.json files, asks for every visible item, and writes
a .config file for make plus a C header with generated macros.

Examples:
  • jconfig configure -i config.json
      → Interactive run writing .config and autogen.h

  • jconfig load -i .config -t config.json -o .new_config
      → Replay a saved configuration

  • jconfig show -i config.json
      → Print the items of every visible schema")]
pub struct Cli {
    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "JCONFIG_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to the settings file
    #[arg(long, env = SETTINGS_ENV, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Do not clone or build repos declared in schemas
    #[arg(long, global = true)]
    pub skip_repos: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the jconfig CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Configure interactively
    Configure(cmd::configure::ConfigureCommand),

    /// Replay a saved configuration
    Load(cmd::load::LoadCommand),

    /// Print the configuration tree
    Show(cmd::show::ShowCommand),
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    jconfig_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let settings =
        Settings::discover(cli.settings.as_deref(), &cwd).context("Failed to load settings")?;
    let context = RuntimeContext::new(settings, cwd, cli.skip_repos);

    execute_command(cli.command, &context)
}

fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Configure(cmd) => cmd.execute(context)?,
        Commands::Load(cmd) => cmd.execute(context)?,
        Commands::Show(cmd) => {
            cmd.execute(context)?;
        }
    }
    Ok(())
}
