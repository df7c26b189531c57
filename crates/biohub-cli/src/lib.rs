//! The `biohub` command-line tool.
//!
//! # Modules
//!
//! - [`cli`]: `clap` argument definitions
//! - [`commands`]: `serve`, `ask`, `review`, and logging setup
//! - [`config_handlers`]: `config path|get|set|init|export`

#![doc = include_str!("../README.md")]

pub mod cli;
pub mod commands;
pub mod config_handlers;

use anyhow::{Context, Result};
use biohub_core::{BiohubConfig, ConfigManager};

pub use cli::{Cli, Command, ConfigAction};

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    if let Command::Config { action } = cli.command {
        commands::init_logging("warn");
        return config_handlers::handle_config_command(config_path, action)
            .context("config command failed");
    }

    let config = BiohubConfig::load(config_path).context("could not load configuration")?;
    commands::init_logging(&config.logging.filter);

    match cli.command {
        Command::Serve { host, port } => commands::serve(config, host, port).await,
        Command::Ask { question } => {
            println!("{}", commands::ask(&config, &question).await?);
            Ok(())
        }
        Command::Review { query, context } => {
            println!(
                "{}",
                commands::review(&config, &query, context.as_deref()).await?
            );
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}
