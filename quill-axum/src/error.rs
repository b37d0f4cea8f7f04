use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::errors::QuillError;

#[derive(Debug)]
pub struct RelayError(pub anyhow::Error);

impl From<anyhow::Error> for RelayError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<QuillError> for RelayError {
    fn from(e: QuillError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // A QuillError anywhere in the chain keeps its status and message.
        // Anything else is an internal failure and is never echoed back.
        let found = self
            .0
            .chain()
            .find_map(|e| e.downcast_ref::<QuillError>())
            .map(QuillError::sanitize_for_client);

        let quill = match found {
            Some(quill) => quill,
            None => {
                tracing::error!(error = %self.0, "relay request failed");
                QuillError::normalize(self.0).sanitize_for_client()
            }
        };

        let status =
            StatusCode::from_u16(quill.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(quill.to_json())).into_response()
    }
}
