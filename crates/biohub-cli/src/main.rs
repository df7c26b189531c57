//! BioHub CLI
//!
//! Runs the BioHub API server and administers its configuration.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use biohub_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    biohub_cli::run(Cli::parse()).await
}
