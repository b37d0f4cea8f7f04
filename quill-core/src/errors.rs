//! # Errors
//!
//! Quill keeps two families of errors:
//! - typed `thiserror` enums for the draft model and local validation
//!   (`DraftError`, `ValidationError`)
//! - a structured `QuillError` that can be carried through
//!   `anyhow::Error` and rendered by the relay as
//!   `{"success": false, "message": ...}`
//!
//! The relay decides how to serialize; `QuillError` itself is
//! transport-agnostic apart from the status code it maps to.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::json;
use thiserror::Error;

use crate::block::BlockId;

/// Generic message returned whenever the relay hides an internal failure.
pub const GENERIC_SERVER_MESSAGE: &str = "Server error. Please try again.";

/// Errors raised while editing a draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Block {0} does not exist")]
    UnknownBlock(BlockId),

    #[error("Block {0} is being removed")]
    BlockRemoving(BlockId),

    #[error("Block {id} is a {kind} block and cannot hold that value")]
    KindMismatch { id: BlockId, kind: &'static str },
}

/// Reasons a draft is rejected before anything is sent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    #[error("Please enter a title")]
    MissingTitle,

    #[error("Please enter at least one Blog ID")]
    MissingTargets,

    #[error("Please add at least one content block")]
    NoContentBlocks,
}

/// Relay error classes and the status codes they map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    MethodNotAllowed, // 405
    PayloadTooLarge,  // 413
    GeneralError,     // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::GeneralError => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ErrorKind::GeneralError => "GeneralError",
        }
    }
}

/// A structured relay error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct QuillError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl QuillError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through handler `?` chains.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `QuillError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&QuillError> {
        err.downcast_ref::<QuillError>()
    }

    /// Turn any error into a QuillError:
    /// - if it's already a QuillError, keep it
    /// - otherwise wrap as GeneralError with the generic message
    pub fn normalize(err: AnyError) -> QuillError {
        match err.downcast::<QuillError>() {
            Ok(quill) => quill,
            Err(other) => QuillError::general_error(GENERIC_SERVER_MESSAGE).with_source(other),
        }
    }

    /// Client-safe copy: keeps kind and message, drops the source chain.
    pub fn sanitize_for_client(&self) -> QuillError {
        QuillError {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }

    /// Relay JSON payload.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "success": false,
            "message": self.message,
        })
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg)
    }
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for QuillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for QuillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
