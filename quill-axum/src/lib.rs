//! quill-axum: the publishing relay.
//!
//! Accepts multipart post submissions from untrusted clients, checks them,
//! and forwards them unchanged to the publishing webhook with a credential
//! the client never sees.

pub mod app;
pub mod backend;
pub mod config;
pub mod middlewares;
pub mod relay;
pub mod state;
mod error;

pub use app::{RelayApp, HEALTH_PATH};
pub use backend::{Backend, BackendResponse, Submission, WebhookBackend};
pub use config::RelayConfig;
pub use error::RelayError;
pub use middlewares::API_KEY_HEADER;
pub use state::RelayState;

pub use axum;
