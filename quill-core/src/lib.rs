//! quill-core: the framework-agnostic part of Quill.
//!
//! A post is composed as an ordered list of typed content blocks
//! (text or image). `quill-core` owns that model, turns a finished
//! draft into a submission payload, and defines the error and config
//! types shared by the client and the relay.

pub mod block;
pub mod config;
pub mod draft;
pub mod errors;
pub mod payload;

pub use block::{
    BlockId, BlockIdGen, BlockKind, BlockList, BlockPayload, BlockValue, ContentBlock, FileRef,
    FileSource,
};
pub use config::{InvalidConfigValue, QuillConfig, QuillConfigSnapshot};
pub use draft::{parse_target_ids, PostDraft};
pub use errors::{DraftError, ErrorKind, QuillError, ValidationError};
pub use payload::{Attachment, SerializeOptions, SerializedBlock, SubmissionPayload};
