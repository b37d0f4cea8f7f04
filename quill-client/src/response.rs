//! Relay response contract.
//!
//! ```json
//! { "success": true, "message": "...", "posts": [{ "blogId": "b1", "url": "https://..." }] }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{SubmitError, SubmitResult};

/// Notification shown when the server publishes without a message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Post published successfully!";

#[derive(Debug, Clone, Deserialize)]
pub struct RelayResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Kept loose: anything but an array is ignored.
    #[serde(default)]
    pub posts: Option<Value>,
}

/// One published destination. The surrounding UI lists these and copies
/// `url` to the clipboard on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub identifier: String,
    pub url: String,
}

/// Successful outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Published {
    pub message: Option<String>,
    pub posts: Vec<PublishedPost>,
}

impl Published {
    pub fn notification(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_SUCCESS_MESSAGE)
    }
}

impl From<RelayResponse> for Published {
    fn from(res: RelayResponse) -> Self {
        let posts = match res.posts {
            Some(Value::Array(entries)) => entries.iter().filter_map(published_post).collect(),
            _ => Vec::new(),
        };

        Self {
            message: non_empty(res.message),
            posts,
        }
    }
}

fn published_post(entry: &Value) -> Option<PublishedPost> {
    let url = entry.get("url")?.as_str()?.trim();
    if url.is_empty() {
        return None;
    }

    let identifier = entry
        .get("identifier")
        .or_else(|| entry.get("blogId"))
        .map(|id| match id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    Some(PublishedPost {
        identifier,
        url: url.to_string(),
    })
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Map a status code and raw body to the submission outcome.
pub fn interpret(status: u16, body: &[u8]) -> SubmitResult<Published> {
    let ok_status = (200..300).contains(&status);

    match serde_json::from_slice::<RelayResponse>(body) {
        Ok(res) if ok_status && res.success => Ok(res.into()),
        Ok(res) => Err(SubmitError::RequestRejected {
            status,
            message: non_empty(res.message),
        }),
        Err(source) if ok_status => Err(SubmitError::InvalidResponse { status, source }),
        Err(_) => Err(SubmitError::RequestRejected {
            status,
            message: None,
        }),
    }
}
