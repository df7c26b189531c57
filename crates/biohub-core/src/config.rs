//! Configuration loading for BioHub.
//!
//! Configuration is layered with figment, later sources overriding earlier:
//! 1. Default values
//! 2. TOML config file (`~/.config/biohub/config.toml` or an explicit path)
//! 3. Hosted-provider environment names (`SUPABASE_URL`, `GEMINI_API_KEY`, ...)
//! 4. Environment variables prefixed with `BIOHUB_`, `__` separating sections
//!    (`BIOHUB_SERVER__PORT=8080`)

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

const PROJECT_NAME: &str = "biohub";
const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "BIOHUB_";

/// Operations the `config` subcommands need from a configuration type.
pub trait ConfigManager: Default + Serialize + DeserializeOwned {
    /// Name used for the config directory and in user-facing hints.
    fn project_name() -> &'static str;

    /// Platform default location of the config file.
    fn default_config_path() -> Option<PathBuf>;

    /// Loads the configuration from every source.
    fn load(config_path: Option<&str>) -> Result<Self>;

    /// The explicit path when given, otherwise the default location.
    fn resolve_config_path(config_path: Option<&str>) -> Option<PathBuf> {
        match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    /// Renders the configuration as a TOML document.
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flattens the configuration into `PREFIX_SECTION__KEY=value` pairs.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>>;
}

/// Where rows are read from and written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The hosted PostgREST endpoint.
    #[default]
    Rest,
    /// An in-process store that forgets everything on exit.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiohubConfig {
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

/// Hosted database and auth project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: String,
    /// JWT secret used to verify access tokens locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// Token validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When `false`, every request is let through without a user.
    pub enabled: bool,
    /// Expected `aud` claim of access tokens.
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audience: "authenticated".to_string(),
        }
    }
}

/// Generative text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Answer with canned text instead of calling the model.
    pub mock: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_output_tokens: 2048,
            temperature: 0.7,
            mock: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,biohub=debug".to_string(),
        }
    }
}

impl BiohubConfig {
    /// Builds the layered figment for `config_file`.
    pub fn figment(config_file: Option<PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(BiohubConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::raw().filter_map(|key| {
                let mapped = match key.as_str().to_ascii_uppercase().as_str() {
                    "NEXT_PUBLIC_SUPABASE_URL" => "supabase.url",
                    "NEXT_PUBLIC_SUPABASE_ANON_KEY" => "supabase.anon_key",
                    _ => return None,
                };
                Some(mapped.into())
            }))
            .merge(Env::raw().filter_map(|key| {
                let mapped = match key.as_str().to_ascii_uppercase().as_str() {
                    "SUPABASE_URL" => "supabase.url",
                    "SUPABASE_ANON_KEY" => "supabase.anon_key",
                    "SUPABASE_JWT_SECRET" => "supabase.jwt_secret",
                    "GEMINI_API_KEY" => "ai.api_key",
                    _ => return None,
                };
                Some(mapped.into())
            }))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Checks the values needed to serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Memory {
            if self.auth.enabled
                && self.supabase.url.trim().is_empty()
                && self.supabase.jwt_secret.is_none()
            {
                return Err(Error::config(
                    "auth needs supabase.url or supabase.jwt_secret to check tokens",
                ));
            }
        } else {
            let url = self.supabase.url.trim();
            if url.is_empty() {
                return Err(Error::config(
                    "supabase.url is required (set SUPABASE_URL or BIOHUB_SUPABASE__URL)",
                ));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::config(format!(
                    "supabase.url must be an http(s) URL, got '{url}'"
                )));
            }
            if self.supabase.anon_key.trim().is_empty() {
                return Err(Error::config(
                    "supabase.anon_key is required (set SUPABASE_ANON_KEY)",
                ));
            }
        }
        if self.server.port == 0 {
            return Err(Error::config("server.port must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(Error::config("ai.temperature must be between 0.0 and 2.0"));
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Supabase project URL without a trailing slash.
    pub fn supabase_url(&self) -> &str {
        self.supabase.url.trim().trim_end_matches('/')
    }
}

impl ConfigManager for BiohubConfig {
    fn project_name() -> &'static str {
        PROJECT_NAME
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join(CONFIG_FILE_NAME))
    }

    fn load(config_path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_config_path(config_path);
        Ok(Self::figment(path).extract()?)
    }

    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_env(&value, ENV_PREFIX.trim_end_matches('_'), &mut vars);
        Ok(vars)
    }
}

fn flatten_env(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let separator = if prefix.contains('_') { "__" } else { "_" };
                let name = format!("{prefix}{separator}{}", key.to_uppercase());
                flatten_env(child, &name, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            out.push((prefix.to_string(), format!("[{joined}]")));
        }
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
