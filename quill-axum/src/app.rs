use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::backend::{Backend, WebhookBackend};
use crate::config::RelayConfig;
use crate::relay::relay_router;
use crate::RelayState;

pub const HEALTH_PATH: &str = "/health";

/// The relay as a ready-to-serve router.
///
/// Requests get an `x-request-id` (kept when the caller sent one) that is
/// echoed on the response and recorded by the trace layer.
#[derive(Clone)]
pub struct RelayApp {
    pub state: RelayState,
    pub router: Router<()>,
}

impl RelayApp {
    pub fn new(config: RelayConfig, backend: Arc<dyn Backend>) -> Self {
        let state = RelayState::new(config, backend);
        let router = Router::new()
            .route(HEALTH_PATH, get(health))
            .merge(relay_router(state.clone()))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            );

        Self { state, router }
    }

    /// Validate `config` and forward to its webhook.
    pub fn from_config(config: RelayConfig) -> Result<Self> {
        config.validate()?;
        let backend = WebhookBackend::new(
            config.webhook_url.clone(),
            config.internal_api_key.clone(),
            config.forward_timeout,
        )?;
        Ok(Self::new(config, Arc::new(backend)))
    }

    pub async fn listen<A>(self, addr: A) -> Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            path = %self.state.config.path,
            "relay listening"
        );
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}
