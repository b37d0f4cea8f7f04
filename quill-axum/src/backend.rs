//! Forwarding to the publishing backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;

use crate::API_KEY_HEADER;

/// An accepted inbound submission, byte for byte.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Inbound `content-type`, boundary included
    pub content_type: String,
    pub body: Bytes,
}

/// What the backend answered; relayed to the caller verbatim.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Bytes,
}

/// The system that actually publishes.
///
/// Errors mean the forward itself failed (unreachable, transfer error);
/// a backend that answers with a failure status is still `Ok`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn forward(&self, submission: Submission) -> Result<BackendResponse>;
}

/// Posts submissions to a webhook URL with the internal credential.
pub struct WebhookBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl WebhookBackend {
    pub fn new<U, K>(url: U, api_key: K, timeout: Duration) -> Result<Self>
    where
        U: Into<String>,
        K: Into<String>,
    {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self::with_client(client, url, api_key, timeout))
    }

    pub fn with_client<U, K>(client: reqwest::Client, url: U, api_key: K, timeout: Duration) -> Self
    where
        U: Into<String>,
        K: Into<String>,
    {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Backend for WebhookBackend {
    async fn forward(&self, submission: Submission) -> Result<BackendResponse> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, submission.content_type)
            .body(submission.body)
            .send()
            .await
            .context("Webhook request failed")?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("Failed to read webhook response")?;

        Ok(BackendResponse { status, body })
    }
}
