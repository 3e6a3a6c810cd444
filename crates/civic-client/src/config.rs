// Client configuration resolved once at process start.
//
// Environment variables win over defaults, and an optional YAML file wins over
// both. Every default points at a local backend so a bare checkout runs.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_TOKEN_EXPIRATION_KEY: &str = "tokenExpiration";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RECONNECT_INITIAL_MS: u64 = 500;
pub const DEFAULT_RECONNECT_MAX_MS: u64 = 30_000;
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // Base URL of the REST API.
    pub api_url: String,
    // Backend URI the push channel connects to.
    pub push_url: String,
    // Fixed number of complaints per page.
    pub page_size: u32,
    // Persisted-state key holding the forced-logout marker.
    pub token_expiration_key: String,
    // Optional bearer token sent with API requests.
    pub access_token: Option<String>,
    pub request_timeout_ms: u64,
    // First reconnect delay; doubles per failed attempt.
    pub reconnect_initial_ms: u64,
    // Upper bound for the reconnect delay.
    pub reconnect_max_ms: u64,
    // Broadcast capacity for notification listeners.
    pub notification_buffer: usize,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
struct ClientConfigOverride {
    api_url: Option<String>,
    push_url: Option<String>,
    page_size: Option<u32>,
    token_expiration_key: Option<String>,
    access_token: Option<String>,
    request_timeout_ms: Option<u64>,
    reconnect_initial_ms: Option<u64>,
    reconnect_max_ms: Option<u64>,
    notification_buffer: Option<usize>,
}

impl ClientConfig {
    pub fn local_defaults() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            push_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            token_expiration_key: DEFAULT_TOKEN_EXPIRATION_KEY.to_string(),
            access_token: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            reconnect_initial_ms: DEFAULT_RECONNECT_INITIAL_MS,
            reconnect_max_ms: DEFAULT_RECONNECT_MAX_MS,
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::local_defaults();
        if let Some(value) = read_string_env("CIVIC_API_URL") {
            config.api_url = value.clone();
            config.push_url = value;
        }
        if let Some(value) = read_string_env("CIVIC_PUSH_URL") {
            config.push_url = value;
        }
        if let Some(value) = read_u32_env("CIVIC_PAGE_SIZE") {
            config.page_size = value;
        }
        if let Some(value) = read_string_env("CIVIC_TOKEN_EXPIRATION_KEY") {
            config.token_expiration_key = value;
        }
        if let Some(value) = read_string_env("CIVIC_ACCESS_TOKEN") {
            config.access_token = Some(value);
        }
        if let Some(value) = read_u64_env("CIVIC_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = value;
        }
        if let Some(value) = read_u64_env("CIVIC_RECONNECT_INITIAL_MS") {
            config.reconnect_initial_ms = value;
        }
        if let Some(value) = read_u64_env("CIVIC_RECONNECT_MAX_MS") {
            config.reconnect_max_ms = value;
        }
        if let Some(value) = read_usize_env("CIVIC_NOTIFICATION_BUFFER") {
            config.notification_buffer = value;
        }
        config.sanitize();
        config
    }

    pub fn from_env_or_yaml(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::from_env();
        let override_path = config_path
            .map(|value| value.to_string())
            .or_else(|| std::env::var("CIVIC_CLIENT_CONFIG").ok());
        if let Some(path) = override_path {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read client config: {path}"))?;
            let override_cfg: ClientConfigOverride =
                serde_yaml::from_str(&contents).context("parse client config yaml")?;
            override_cfg.apply(&mut config);
        }
        config.sanitize();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }

    // Zero page sizes and inverted backoff bounds would wedge pagination and reconnects.
    fn sanitize(&mut self) {
        self.page_size = self.page_size.max(1);
        self.notification_buffer = self.notification_buffer.max(1);
        self.reconnect_initial_ms = self.reconnect_initial_ms.max(1);
        self.reconnect_max_ms = self.reconnect_max_ms.max(self.reconnect_initial_ms);
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self.push_url = self.push_url.trim_end_matches('/').to_string();
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::local_defaults()
    }
}

impl ClientConfigOverride {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(value) = self.api_url {
            config.api_url = value;
        }
        if let Some(value) = self.push_url {
            config.push_url = value;
        }
        if let Some(value) = self.page_size {
            config.page_size = value;
        }
        if let Some(value) = self.token_expiration_key {
            config.token_expiration_key = value;
        }
        if let Some(value) = self.access_token {
            config.access_token = Some(value);
        }
        if let Some(value) = self.request_timeout_ms {
            config.request_timeout_ms = value;
        }
        if let Some(value) = self.reconnect_initial_ms {
            config.reconnect_initial_ms = value;
        }
        if let Some(value) = self.reconnect_max_ms {
            config.reconnect_max_ms = value;
        }
        if let Some(value) = self.notification_buffer {
            config.notification_buffer = value;
        }
    }
}

fn read_string_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_u32_env(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

fn read_u64_env(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

fn read_usize_env(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}
