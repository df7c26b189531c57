//! Runners for `serve`, `ask`, and `review`.

use anyhow::{Context, Result};
use biohub_ai::{ResearchAssistant, provider_from_config};
use biohub_api::{AppState, Server};
use biohub_core::BiohubConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Applies the command-line overrides, checks the configuration, and builds
/// the server.
pub fn prepare_server(
    mut config: BiohubConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<Server> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        store = ?config.store.backend,
        auth = config.auth.enabled,
        ai_mock = config.ai.mock,
        "starting biohub {}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(Server::new(AppState::from_config(config)))
}

/// `biohub serve`
pub async fn serve(config: BiohubConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    prepare_server(config, host, port)?
        .run()
        .await
        .context("server failed")
}

fn assistant(config: &BiohubConfig) -> ResearchAssistant {
    ResearchAssistant::new(provider_from_config(&config.ai))
}

/// `biohub ask`
pub async fn ask(config: &BiohubConfig, question: &str) -> Result<String> {
    assistant(config)
        .ask(question)
        .await
        .context("the research assistant could not answer")
}

/// `biohub review`
pub async fn review(config: &BiohubConfig, query: &str, context: Option<&str>) -> Result<String> {
    assistant(config)
        .literature_review(query, context)
        .await
        .context("the literature review could not be generated")
}
