//! Ordered, editable list of content blocks.
//!
//! Blocks are addressed by a [`BlockId`] handed out by the list's own
//! generator. Ids are never reused within one list, so display numbers
//! have gaps after removals.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use thiserror::Error;

use crate::errors::DraftError;

/// Time a removed block stays attached while its exit transition plays.
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(300);

/// Display identifier of a block, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl BlockId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source owned by a single [`BlockList`].
#[derive(Debug, Default)]
pub struct BlockIdGen {
    last: u64,
}

impl BlockIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> BlockId {
        self.last += 1;
        BlockId(self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
    #[default]
    Unset,
    Text,
    Image,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Unset => "unset",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block kind '{0}'")]
pub struct UnknownBlockKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    /// Accepts the select values a form would post; empty means "not chosen".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "unset" => Ok(BlockKind::Unset),
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            other => Err(UnknownBlockKind(other.to_string())),
        }
    }
}

/// Where the bytes of a selected file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Memory(Bytes),
    /// Read lazily when the submission is sent.
    Path(PathBuf),
}

/// A single selected file: name, byte size and a handle to its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    size: u64,
    content_type: Option<String>,
    source: FileSource,
}

impl FileRef {
    pub fn from_bytes<S, B>(name: S, bytes: B) -> Self
    where
        S: Into<String>,
        B: Into<Bytes>,
    {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: None,
            source: FileSource::Memory(bytes),
        }
    }

    /// Reference a file on disk. Only metadata is read here; the content
    /// type is guessed from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            name,
            size: meta.len(),
            content_type: mime_guess::from_path(path).first_raw().map(str::to_string),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Preview text such as `cover.png (12.50 KB)`.
    pub fn size_label(&self) -> String {
        format!("{} ({:.2} KB)", self.name, self.size as f64 / 1024.0)
    }
}

/// Kind-specific slot of a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockPayload {
    #[default]
    Unset,
    /// Raw input; trimming happens at serialization time.
    Text(String),
    Image(Option<FileRef>),
}

impl BlockPayload {
    pub fn empty_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Unset => BlockPayload::Unset,
            BlockKind::Text => BlockPayload::Text(String::new()),
            BlockKind::Image => BlockPayload::Image(None),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockPayload::Unset => BlockKind::Unset,
            BlockPayload::Text(_) => BlockKind::Text,
            BlockPayload::Image(_) => BlockKind::Image,
        }
    }
}

/// Value handed to [`BlockList::set_block_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValue {
    Text(String),
    Image(FileRef),
}

#[derive(Debug, Clone)]
pub struct ContentBlock {
    id: BlockId,
    payload: BlockPayload,
    removing_since: Option<Instant>,
}

impl ContentBlock {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            payload: BlockPayload::Unset,
            removing_since: None,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            BlockPayload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&FileRef> {
        match &self.payload {
            BlockPayload::Image(file) => file.as_ref(),
            _ => None,
        }
    }

    pub fn is_removing(&self) -> bool {
        self.removing_since.is_some()
    }

    pub fn label(&self) -> String {
        format!("Block {}", self.id)
    }
}

/// The ordered block sequence of a draft.
#[derive(Debug)]
pub struct BlockList {
    blocks: Vec<ContentBlock>,
    ids: BlockIdGen,
    removal_delay: Duration,
}

impl Default for BlockList {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockList {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            ids: BlockIdGen::new(),
            removal_delay: DEFAULT_REMOVAL_DELAY,
        }
    }

    pub fn with_removal_delay(mut self, delay: Duration) -> Self {
        self.removal_delay = delay;
        self
    }

    pub fn removal_delay(&self) -> Duration {
        self.removal_delay
    }

    /// Append an unset block at the end.
    pub fn add_block(&mut self) -> BlockId {
        let id = self.ids.next_id();
        self.blocks.push(ContentBlock::new(id));
        id
    }

    /// Start removing a block. It stays attached until [`BlockList::sweep`]
    /// runs after the removal delay, and the removal cannot be undone.
    ///
    /// Returns the instant from which the block may be detached.
    pub fn remove_block(&mut self, id: BlockId) -> Result<Instant, DraftError> {
        self.remove_block_at(id, Instant::now())
    }

    pub fn remove_block_at(&mut self, id: BlockId, now: Instant) -> Result<Instant, DraftError> {
        let delay = self.removal_delay;
        let block = self.editable_mut(id)?;
        block.removing_since = Some(now);
        Ok(now + delay)
    }

    /// Detach every block whose removal delay has elapsed at `now`.
    pub fn sweep(&mut self, now: Instant) -> Vec<BlockId> {
        let delay = self.removal_delay;
        let mut detached = Vec::new();
        self.blocks.retain(|block| match block.removing_since {
            Some(since) if now.saturating_duration_since(since) >= delay => {
                detached.push(block.id);
                false
            }
            _ => true,
        });
        if !detached.is_empty() {
            tracing::debug!(count = detached.len(), "detached removed blocks");
        }
        detached
    }

    /// Change a block's kind. Any previously entered value is discarded.
    pub fn set_block_kind(&mut self, id: BlockId, kind: BlockKind) -> Result<(), DraftError> {
        let block = self.editable_mut(id)?;
        block.payload = BlockPayload::empty_for(kind);
        Ok(())
    }

    pub fn set_block_payload(&mut self, id: BlockId, value: BlockValue) -> Result<(), DraftError> {
        let block = self.editable_mut(id)?;
        match (&mut block.payload, value) {
            (BlockPayload::Text(slot), BlockValue::Text(text)) => *slot = text,
            (BlockPayload::Image(slot), BlockValue::Image(file)) => *slot = Some(file),
            (payload, _) => {
                return Err(DraftError::KindMismatch {
                    id,
                    kind: payload.kind().as_str(),
                })
            }
        }
        Ok(())
    }

    pub fn set_text(&mut self, id: BlockId, text: impl Into<String>) -> Result<(), DraftError> {
        self.set_block_payload(id, BlockValue::Text(text.into()))
    }

    pub fn set_image(&mut self, id: BlockId, file: FileRef) -> Result<(), DraftError> {
        self.set_block_payload(id, BlockValue::Image(file))
    }

    /// Deselect the file of an image block.
    pub fn clear_image(&mut self, id: BlockId) -> Result<(), DraftError> {
        let block = self.editable_mut(id)?;
        match &mut block.payload {
            BlockPayload::Image(slot) => {
                *slot = None;
                Ok(())
            }
            other => Err(DraftError::KindMismatch {
                id,
                kind: other.kind().as_str(),
            }),
        }
    }

    pub fn get(&self, id: BlockId) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// All attached blocks in order, including ones being removed.
    pub fn iter(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Counter text such as `1 block` or `3 blocks`.
    pub fn count_label(&self) -> String {
        let count = self.len();
        format!("{count} block{}", if count == 1 { "" } else { "s" })
    }

    fn editable_mut(&mut self, id: BlockId) -> Result<&mut ContentBlock, DraftError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(DraftError::UnknownBlock(id))?;
        if block.is_removing() {
            return Err(DraftError::BlockRemoving(id));
        }
        Ok(block)
    }
}
