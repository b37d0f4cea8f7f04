use std::time::Duration;

/// Default multipart field carrying the target ids.
pub const DEFAULT_TARGETS_FIELD: &str = "blogIds";

/// Configuration for a [`crate::SubmissionClient`].
///
/// Only the relay's *public* key belongs here. Backend credentials
/// live in the relay's environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay endpoint, e.g. `https://example.org/api/blog`
    pub endpoint: String,

    /// Sent as `x-api-key` when the relay authenticates clients
    pub api_key: Option<String>,

    /// Overall deadline for one submission (None = transport default)
    pub timeout: Option<Duration>,

    /// Collect target ids and refuse to send without at least one
    pub require_targets: bool,

    /// Multipart field name for the target ids JSON array
    pub targets_field: String,
}

impl ClientConfig {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: None,
            require_targets: true,
            targets_field: DEFAULT_TARGETS_FIELD.to_string(),
        }
    }

    pub fn with_api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn require_targets(mut self, require: bool) -> Self {
        self.require_targets = require;
        self
    }

    pub fn with_targets_field<S: Into<String>>(mut self, field: S) -> Self {
        self.targets_field = field.into();
        self
    }
}
