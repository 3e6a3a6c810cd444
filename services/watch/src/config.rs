//! Process configuration for the watcher.
//!
//! Client settings come from [`ClientConfig::from_env_or_yaml`]; the watcher
//! only adds the optional Prometheus bind address.
use anyhow::{Context, Result};
use civic_client::ClientConfig;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub client: ClientConfig,
    /// `None` leaves the metrics endpoint off.
    pub metrics_bind: Option<SocketAddr>,
}

impl WatchConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let client = ClientConfig::from_env_or_yaml(config_path)?;
        Ok(Self {
            client,
            metrics_bind: metrics_bind_from_env()?,
        })
    }
}

fn metrics_bind_from_env() -> Result<Option<SocketAddr>> {
    match std::env::var("CIVIC_METRICS_BIND") {
        Ok(value) if !value.trim().is_empty() => {
            let addr = value
                .trim()
                .parse()
                .with_context(|| format!("parse CIVIC_METRICS_BIND: {value}"))?;
            Ok(Some(addr))
        }
        _ => Ok(None),
    }
}
