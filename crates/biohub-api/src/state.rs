//! Shared application state.

use std::sync::Arc;

use biohub_ai::{ResearchAssistant, provider_from_config};
use biohub_auth::{AuthenticatedUser, GoTrueClient, SupabaseTokenValidator, TokenValidator};
use biohub_core::BiohubConfig;
use biohub_store::SharedStore;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Row storage acting as the anonymous client.
    pub store: SharedStore,
    /// Validates bearer tokens for the auth middleware.
    pub validator: Arc<dyn TokenValidator>,
    /// Hosted auth service, when a project URL is configured.
    pub gotrue: Option<GoTrueClient>,
    /// Research-assistant service.
    pub assistant: ResearchAssistant,
    /// Loaded configuration.
    pub config: Arc<BiohubConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.name())
            .field("gotrue", &self.gotrue)
            .field("assistant", &self.assistant)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the store, auth, and assistant described by `config`.
    pub fn from_config(config: BiohubConfig) -> Self {
        let store = biohub_store::from_config(&config);

        let url = config.supabase_url();
        let gotrue = (!url.is_empty() && !config.supabase.anon_key.is_empty())
            .then(|| GoTrueClient::new(url, config.supabase.anon_key.clone()));

        let validator = Arc::new(SupabaseTokenValidator::new(
            config.supabase.jwt_secret.clone(),
            gotrue.clone(),
        ));
        let assistant = ResearchAssistant::new(provider_from_config(&config.ai));

        tracing::info!(
            store = store.name(),
            auth_service = gotrue.is_some(),
            auth_enabled = config.auth.enabled,
            model = assistant.model(),
            "application state ready"
        );

        Self {
            store,
            validator,
            gotrue,
            assistant,
            config: Arc::new(config),
        }
    }

    /// Assembles state from parts.
    pub fn new(
        config: BiohubConfig,
        store: SharedStore,
        validator: Arc<dyn TokenValidator>,
        assistant: ResearchAssistant,
    ) -> Self {
        Self {
            store,
            validator,
            gotrue: None,
            assistant,
            config: Arc::new(config),
        }
    }

    /// The store acting as `user`, so row-level security applies.
    pub fn store_for(&self, user: &AuthenticatedUser) -> SharedStore {
        self.store.for_access_token(&user.access_token)
    }
}
