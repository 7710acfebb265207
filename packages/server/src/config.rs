use std::time::Duration;

use axum::http::HeaderValue;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Reject origins that cannot be sent as an `Access-Control-Allow-Origin` value.
    pub fn validate(self) -> Result<Self, ConfigError> {
        for origin in &self.allow_origins {
            if origin.trim().is_empty() || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Message(format!(
                    "server.cors.allow_origins contains an invalid origin: '{origin}'"
                )));
            }
        }
        Ok(self)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Base URLs of the external vote and results services.
///
/// Either URL may be absent; the matching route then answers with a
/// configuration error instead of calling out.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub vote_api_url: Option<String>,
    #[serde(default)]
    pub results_api_url: Option<String>,
    /// Per-request timeout in seconds. 0 disables the timeout. Default: 10.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            vote_api_url: None,
            results_api_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Names of the settings that are not configured.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vote_api_url.is_none() {
            missing.push("upstream.vote_api_url");
        }
        if self.results_api_url.is_none() {
            missing.push("upstream.results_api_url");
        }
        missing
    }

    /// Drop blank values, trim trailing slashes, and reject anything that is
    /// not an absolute http(s) URL.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.vote_api_url = normalize_base_url("upstream.vote_api_url", self.vote_api_url)?;
        self.results_api_url =
            normalize_base_url("upstream.results_api_url", self.results_api_url)?;
        Ok(self)
    }
}

fn normalize_base_url(key: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }

    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::Message(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Message(format!(
            "{key} must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(Some(trimmed.to_string()))
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("LIVEPOLL_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("upstream.timeout_secs", 10_i64)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., LIVEPOLL__UPSTREAM__VOTE_API_URL)
            .add_source(
                Environment::with_prefix("LIVEPOLL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins"),
            )
            .set_override_option(
                "upstream.vote_api_url",
                first_env(&["VOTE_API_URL", "NEXT_PUBLIC_VOTE_API_URL"]),
            )?
            .set_override_option(
                "upstream.results_api_url",
                first_env(&["RESULTS_API_URL", "NEXT_PUBLIC_RESULTS_API_URL"]),
            )?
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()
    }

    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.server.cors = self.server.cors.validate()?;
        self.upstream = self.upstream.validate()?;
        Ok(self)
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}
