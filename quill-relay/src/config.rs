use std::env;

use quill_axum::config::{DEFAULT_FORWARD_TIMEOUT, DEFAULT_MAX_BODY_BYTES, DEFAULT_RELAY_PATH};
use quill_core::QuillConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "8788";

/// Prefix for generic overrides, e.g. `QUILL__RELAY__PATH`.
pub const ENV_PREFIX: &str = "QUILL__";

/// Environment variables read for each key, first match wins.
const ENV_KEYS: &[(&str, &[&str])] = &[
    ("http.host", &["HTTP_HOST"]),
    ("http.port", &["HTTP_PORT"]),
    ("relay.path", &["RELAY_PATH"]),
    ("relay.webhook_url", &["RELAY_WEBHOOK_URL", "N8N_WEBHOOK_URL"]),
    (
        "relay.internal_api_key",
        &["RELAY_INTERNAL_API_KEY", "INTERNAL_API_KEY", "N8N_API_KEY"],
    ),
    ("relay.public_api_key", &["RELAY_PUBLIC_API_KEY", "PUBLIC_API_KEY"]),
    ("relay.max_body_bytes", &["RELAY_MAX_BODY_BYTES"]),
    ("relay.forward_timeout_secs", &["RELAY_FORWARD_TIMEOUT_SECS"]),
];

/// Build the relay configuration from the process environment.
pub fn from_env() -> QuillConfig {
    let mut config = configure(|name| env::var(name).ok());
    config.load_env(ENV_PREFIX);
    config
}

/// Fill defaults, then whatever `lookup` resolves for each known key.
pub fn configure<F>(lookup: F) -> QuillConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = QuillConfig::new();
    config.set("http.host", DEFAULT_HOST);
    config.set("http.port", DEFAULT_PORT);
    config.set("relay.path", DEFAULT_RELAY_PATH);
    config.set("relay.max_body_bytes", DEFAULT_MAX_BODY_BYTES.to_string());
    config.set(
        "relay.forward_timeout_secs",
        DEFAULT_FORWARD_TIMEOUT.as_secs().to_string(),
    );

    for (key, names) in ENV_KEYS {
        let value = names
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|value| !value.trim().is_empty());
        if let Some(value) = value {
            config.set(*key, value);
        }
    }

    config
}
