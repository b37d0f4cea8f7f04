use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use quill_core::errors::{QuillError, GENERIC_SERVER_MESSAGE};

use crate::backend::Submission;
use crate::middlewares::{inspect_submission, RelayGuard};
use crate::{RelayError, RelayState};

/// Router exposing the relay on `state.config.path`.
///
/// Every method is routed so the guard can answer 405 itself.
pub fn relay_router(state: RelayState) -> Router<()> {
    let mut guard = RelayGuard::new();
    if let Some(key) = state.config.public_api_key.as_deref() {
        guard = guard.with_public_api_key(key);
    }

    let path = state.config.path.clone();
    Router::new()
        .route(&path, any(relay_submission))
        .route_layer(guard)
        .with_state(state)
}

/// Forward one guarded submission and answer with the backend's status and body.
pub async fn relay_submission(
    State(state): State<RelayState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, RelayError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = axum::body::to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|err| read_error(err, state.config.max_body_bytes))?;

    let summary = inspect_submission(&content_type, body.clone()).await?;
    tracing::info!(
        fields = summary.fields,
        attachments = summary.attachments,
        attachment_bytes = summary.attachment_bytes,
        blocks = ?summary.blocks,
        "forwarding submission"
    );

    let backend = state
        .backend
        .forward(Submission { content_type, body })
        .await
        .map_err(|err| {
            tracing::error!(error = %format!("{err:#}"), "forwarding to backend failed");
            QuillError::general_error(GENERIC_SERVER_MESSAGE).with_source(err)
        })?;

    let status = StatusCode::from_u16(backend.status).unwrap_or(StatusCode::BAD_GATEWAY);
    tracing::info!(status = status.as_u16(), "backend answered");

    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(backend.body))
        .map_err(anyhow::Error::from)?;
    Ok(response)
}

fn read_error(err: axum::Error, limit: usize) -> QuillError {
    let too_large = std::error::Error::source(&err)
        .map(|source| source.is::<http_body_util::LengthLimitError>())
        .unwrap_or(false)
        || err.to_string().contains("length limit");

    if too_large {
        QuillError::payload_too_large(format!("Request body exceeds {limit} bytes"))
    } else {
        tracing::warn!(error = %err, "failed to read request body");
        QuillError::bad_request("Failed to read request body")
    }
}
