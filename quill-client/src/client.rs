use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quill_core::{Attachment, FileSource, PostDraft, SerializeOptions, SubmissionPayload};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::config::ClientConfig;
use crate::error::{SubmitError, SubmitResult};
use crate::response::{interpret, Published};

/// Header carrying the relay's public key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Sends drafts to the relay, one submission at a time.
///
/// Clones share the in-flight flag, so a second `submit` on any clone
/// fails with [`SubmitError::SubmissionInFlight`] while one is outstanding.
#[derive(Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    in_flight: Arc<AtomicBool>,
}

impl SubmissionClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config: Arc::new(config),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, serialize and send `draft`.
    ///
    /// Precondition failures return [`SubmitError::Invalid`] without any
    /// network call. Nothing is retried.
    pub async fn submit(&self, draft: &PostDraft) -> SubmitResult<Published> {
        let options = SerializeOptions::new().require_targets(self.config.require_targets);
        let payload = SubmissionPayload::from_draft(draft, options).inspect_err(|reason| {
            tracing::debug!(%reason, "draft rejected locally");
        })?;
        self.send(&payload).await
    }

    /// Send an already serialized payload.
    pub async fn send(&self, payload: &SubmissionPayload) -> SubmitResult<Published> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let form = self.build_form(payload).await?;

        let mut request = self.http.post(&self.config.endpoint).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        tracing::info!(
            endpoint = %self.config.endpoint,
            blocks = payload.blocks.len(),
            attachments = payload.attachments.len(),
            attachment_bytes = payload.attachment_bytes(),
            "sending submission"
        );

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, timeout = e.is_timeout(), "submission transport failed");
            SubmitError::network(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(SubmitError::network)?;

        let outcome = interpret(status, &body);
        match &outcome {
            Ok(published) => tracing::info!(status, posts = published.posts.len(), "submission published"),
            Err(e) => tracing::warn!(status, error = %e, "submission not published"),
        }
        outcome
    }

    /// Multipart body: title, attachments in block order, blocks, targets.
    async fn build_form(&self, payload: &SubmissionPayload) -> SubmitResult<Form> {
        let mut form = Form::new().text("title", payload.title.clone());

        for attachment in &payload.attachments {
            let part = file_part(attachment).await?;
            form = form.part(attachment.field.clone(), part);
        }

        form = form.text("blocks", payload.blocks_json()?);

        if let Some(targets) = payload.target_ids_json()? {
            form = form.text(self.config.targets_field.clone(), targets);
        }

        Ok(form)
    }
}

/// File part whose bytes are read while the request body is written.
async fn file_part(attachment: &Attachment) -> SubmitResult<Part> {
    let file = &attachment.file;
    let attachment_error = |source: std::io::Error| SubmitError::Attachment {
        field: attachment.field.clone(),
        source,
    };

    let part = match file.source() {
        FileSource::Memory(bytes) => Part::stream_with_length(bytes.clone(), file.size()),
        FileSource::Path(path) => {
            let handle = tokio::fs::File::open(path).await.map_err(attachment_error)?;
            Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), file.size())
        }
    };
    let part = part.file_name(file.name().to_string());

    match file.content_type() {
        Some(content_type) => part.mime_str(content_type).map_err(|e| {
            attachment_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        }),
        None => Ok(part),
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> SubmitResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmitError::SubmissionInFlight)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
