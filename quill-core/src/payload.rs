//! Draft → submission payload.
//!
//! The payload is transport-neutral: a client turns it into a
//! `multipart/form-data` body with the fields, in order:
//!
//! ```text
//! title       trimmed title
//! image_<n>   one raw file per image block, n counting images only
//! blocks      JSON array of {type:"text",value} / {type:"image",fileKey}
//! <targets>   JSON array of target ids (when targets are collected)
//! ```

use serde::{Deserialize, Serialize};

use crate::block::{BlockPayload, FileRef};
use crate::draft::PostDraft;
use crate::errors::ValidationError;

/// Prefix of attachment field names; the full name is `image_<n>`.
pub const IMAGE_FIELD_PREFIX: &str = "image_";

/// One element of the `blocks` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedBlock {
    Text {
        value: String,
    },
    Image {
        #[serde(rename = "fileKey")]
        file_key: String,
    },
}

/// A binary part; `field` equals the `fileKey` of its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub file: FileRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    /// Collect target ids and require at least one.
    pub require_targets: bool,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_targets(mut self, require: bool) -> Self {
        self.require_targets = require;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub title: String,
    pub blocks: Vec<SerializedBlock>,
    pub attachments: Vec<Attachment>,
    pub target_ids: Option<Vec<String>>,
}

impl SubmissionPayload {
    /// Build the payload for `draft`, or report the first failed precondition.
    ///
    /// Checks run in order: title, targets (when required), blocks.
    pub fn from_draft(
        draft: &PostDraft,
        options: SerializeOptions,
    ) -> Result<Self, ValidationError> {
        let title = draft.title().trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        let target_ids = if options.require_targets {
            let ids = draft.target_ids();
            if ids.is_empty() {
                return Err(ValidationError::MissingTargets);
            }
            Some(ids)
        } else {
            None
        };

        let mut blocks = Vec::new();
        let mut attachments = Vec::new();

        for block in draft.blocks().iter().filter(|b| !b.is_removing()) {
            match block.payload() {
                BlockPayload::Text(text) => {
                    let value = text.trim();
                    if !value.is_empty() {
                        blocks.push(SerializedBlock::Text {
                            value: value.to_string(),
                        });
                    }
                }
                BlockPayload::Image(Some(file)) => {
                    let field = format!("{IMAGE_FIELD_PREFIX}{}", attachments.len());
                    blocks.push(SerializedBlock::Image {
                        file_key: field.clone(),
                    });
                    attachments.push(Attachment {
                        field,
                        file: file.clone(),
                    });
                }
                BlockPayload::Image(None) | BlockPayload::Unset => {}
            }
        }

        if blocks.is_empty() {
            return Err(ValidationError::NoContentBlocks);
        }

        tracing::debug!(
            blocks = blocks.len(),
            attachments = attachments.len(),
            targets = target_ids.as_ref().map_or(0, Vec::len),
            "serialized draft"
        );

        Ok(Self {
            title: title.to_string(),
            blocks,
            attachments,
            target_ids,
        })
    }

    /// Value of the `blocks` field.
    pub fn blocks_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.blocks)
    }

    /// Value of the targets field, when targets were collected.
    pub fn target_ids_json(&self) -> serde_json::Result<Option<String>> {
        self.target_ids
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
    }

    /// Total bytes of all attachments.
    pub fn attachment_bytes(&self) -> u64 {
        self.attachments.iter().map(|a| a.file.size()).sum()
    }
}
