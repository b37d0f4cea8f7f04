use bytes::Bytes;
use quill_core::errors::QuillError;

const MALFORMED: &str = "Malformed multipart body";

/// What a well-formed submission body contains.
///
/// Only used for logging and for rejecting bodies that would not parse
/// downstream; the bytes themselves are forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub fields: usize,
    pub attachments: usize,
    pub attachment_bytes: u64,
    pub has_title: bool,
    /// Entries in the `blocks` field, if it held a JSON array
    pub blocks: Option<usize>,
}

/// Walk a buffered multipart body with multer.
pub async fn inspect_submission(
    content_type: &str,
    body: Bytes,
) -> Result<SubmissionSummary, QuillError> {
    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;

    let mut multipart = multer::Multipart::new(
        futures::stream::once(async move { Ok::<Bytes, multer::Error>(body) }),
        boundary,
    );
    let mut summary = SubmissionSummary::default();

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        summary.fields += 1;
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            summary.attachments += 1;
            while let Some(chunk) = field.chunk().await.map_err(malformed)? {
                summary.attachment_bytes += chunk.len() as u64;
            }
            continue;
        }

        let text = field.text().await.map_err(malformed)?;
        match name.as_str() {
            "title" => summary.has_title = !text.trim().is_empty(),
            "blocks" => {
                summary.blocks = serde_json::from_str::<Vec<serde_json::Value>>(&text)
                    .ok()
                    .map(|blocks| blocks.len())
            }
            _ => {}
        }
    }

    Ok(summary)
}

fn malformed(err: multer::Error) -> QuillError {
    tracing::debug!(error = %err, "multipart inspection failed");
    QuillError::bad_request(MALFORMED)
}
