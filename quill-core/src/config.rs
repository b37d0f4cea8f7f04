//! # Quill Configuration
//!
//! A small string key/value store in the style of `app.set()` /
//! `app.get()`. Applications layer their own sources on top; the relay
//! binary fills it from environment variables.
//!
//! ```rust
//! use quill_core::QuillConfig;
//!
//! let mut config = QuillConfig::new();
//! config.set("relay.path", "/api/blog");
//! config.set("relay.max_body_bytes", "1048576");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get("relay.path"), Some("/api/blog"));
//! assert_eq!(snapshot.parse::<usize>("relay.max_body_bytes"), Ok(Some(1_048_576)));
//! ```
//!
//! ## Environment overrides
//! `load_env("QUILL__")` maps `QUILL__RELAY__PATH=/x` to `relay.path`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Default, Clone)]
pub struct QuillConfig {
    values: HashMap<String, String>,
}

impl QuillConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only when no value is present yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Import every environment variable starting with `prefix`.
    ///
    /// `PREFIX__HTTP__PORT=8080` becomes `http.port = "8080"`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> QuillConfigSnapshot {
        QuillConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuillConfigSnapshot {
    map: HashMap<String, String>,
}

impl QuillConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    /// Trimmed, non-empty string value.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parse a typed value. A blank or missing key is `Ok(None)`;
    /// a present value that does not parse is an error, never a silent default.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, InvalidConfigValue>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(raw) = self.get_string(key) else {
            return Ok(None);
        };
        raw.parse::<T>().map(Some).map_err(|e| InvalidConfigValue {
            key: key.to_string(),
            value: raw,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for '{key}': {reason}")]
pub struct InvalidConfigValue {
    pub key: String,
    pub value: String,
    pub reason: String,
}
