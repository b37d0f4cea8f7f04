use std::sync::Arc;

use crate::backend::Backend;
use crate::config::RelayConfig;

/// Shared by every relay request.
#[derive(Clone)]
pub struct RelayState {
    pub backend: Arc<dyn Backend>,
    pub config: Arc<RelayConfig>,
}

impl RelayState {
    pub fn new(config: RelayConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}
