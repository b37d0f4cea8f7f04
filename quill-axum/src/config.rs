use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Result};
use quill_core::QuillConfigSnapshot;

pub const DEFAULT_RELAY_PATH: &str = "/api/blog";
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024; // 50MB
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Relay settings. Credentials only ever live here, on the server side.
#[derive(Clone)]
pub struct RelayConfig {
    /// Route the relay is mounted on
    pub path: String,

    /// Publishing backend webhook
    pub webhook_url: String,

    /// Credential sent to the backend as `x-api-key`
    pub internal_api_key: String,

    /// When set, inbound requests must carry this `x-api-key`
    pub public_api_key: Option<String>,

    /// Maximum inbound body size in bytes
    pub max_body_bytes: usize,

    /// Deadline for one forward to the backend
    pub forward_timeout: Duration,
}

// Keys are redacted so the config can be logged.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("path", &self.path)
            .field("webhook_url", &self.webhook_url)
            .field("internal_api_key", &"<redacted>")
            .field("public_api_key", &self.public_api_key.as_ref().map(|_| "<redacted>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("forward_timeout", &self.forward_timeout)
            .finish()
    }
}

impl RelayConfig {
    pub fn new<U, K>(webhook_url: U, internal_api_key: K) -> Self
    where
        U: Into<String>,
        K: Into<String>,
    {
        Self {
            path: DEFAULT_RELAY_PATH.to_string(),
            webhook_url: webhook_url.into(),
            internal_api_key: internal_api_key.into(),
            public_api_key: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
        }
    }

    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    /// Require inbound `x-api-key` to equal `key`
    pub fn with_public_api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.public_api_key = Some(key.into());
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    /// Read `relay.*` keys from a config snapshot and validate them.
    pub fn from_snapshot(config: &QuillConfigSnapshot) -> Result<Self> {
        let webhook_url = config
            .get_string("relay.webhook_url")
            .ok_or_else(|| anyhow!("Missing 'relay.webhook_url'"))?;
        let internal_api_key = config
            .get_string("relay.internal_api_key")
            .ok_or_else(|| anyhow!("Missing 'relay.internal_api_key'"))?;

        let mut relay = Self::new(webhook_url, internal_api_key);
        if let Some(path) = config.get_string("relay.path") {
            relay = relay.with_path(path);
        }
        if let Some(key) = config.get_string("relay.public_api_key") {
            relay = relay.with_public_api_key(key);
        }
        if let Some(bytes) = config.parse::<usize>("relay.max_body_bytes")? {
            relay = relay.with_max_body_bytes(bytes);
        }
        if let Some(secs) = config.parse::<u64>("relay.forward_timeout_secs")? {
            relay = relay.with_forward_timeout(Duration::from_secs(secs));
        }

        relay.validate()?;
        Ok(relay)
    }

    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(anyhow!("Relay webhook URL is empty"));
        }
        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://") {
            return Err(anyhow!("Relay webhook URL must be http(s)"));
        }
        if self.internal_api_key.trim().is_empty() {
            return Err(anyhow!("Relay internal API key is empty"));
        }
        if self.public_api_key.as_deref() == Some(self.internal_api_key.as_str()) {
            return Err(anyhow!("Public and internal API keys must differ"));
        }
        if !self.path.starts_with('/') {
            return Err(anyhow!("Relay path must start with '/'"));
        }
        Ok(())
    }
}
