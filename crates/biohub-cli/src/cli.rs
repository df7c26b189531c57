//! Command-line arguments.

use clap::{Parser, Subcommand};

/// BioHub: collaborative research colabs, challenges, and an AI research assistant.
#[derive(Parser, Debug)]
#[command(name = "biohub", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overriding `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or edit the configuration file
    Config {
        /// What to do with it
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Ask the research assistant a question
    Ask {
        /// The question
        question: String,
    },

    /// Generate a literature review
    Review {
        /// Topic to review
        query: String,

        /// Research context the review should focus on
        #[arg(long)]
        context: Option<String>,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the config file location
    Path,

    /// Print the value at a dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },

    /// Set the value at a dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value; `true`/`false` and numbers are stored typed
        value: String,
    },

    /// Write a config file with default values
    Init {
        /// Where to write it instead of the default location
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration as environment variables
    Export {
        /// Format each variable as a `--env` flag
        #[arg(long)]
        docker_env: bool,
    },
}
