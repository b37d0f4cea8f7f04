pub mod config;

use anyhow::{Context, Result};
use quill_axum::{RelayApp, RelayConfig};
use quill_core::QuillConfig;

/// Build the relay from an explicit config store.
pub fn build_with(config: &QuillConfig) -> Result<RelayApp> {
    let relay = RelayConfig::from_snapshot(&config.snapshot())
        .context("Invalid relay configuration")?;
    tracing::debug!(config = ?relay, "relay configured");
    RelayApp::from_config(relay)
}

/// `host:port` the relay should bind to.
pub fn bind_addr(config: &QuillConfig) -> String {
    let host = config.get("http.host").unwrap_or(config::DEFAULT_HOST);
    let port = config.get("http.port").unwrap_or(config::DEFAULT_PORT);
    format!("{host}:{port}")
}
