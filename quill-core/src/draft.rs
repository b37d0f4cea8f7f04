use crate::block::BlockList;

/// Number of empty blocks a fresh draft starts with.
pub const INITIAL_BLOCKS: usize = 2;

/// The post being composed: title, raw target input and blocks.
#[derive(Debug)]
pub struct PostDraft {
    title: String,
    targets: String,
    blocks: BlockList,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PostDraft {
    pub fn new() -> Self {
        Self::with_blocks(BlockList::new())
    }

    /// Start from a custom block list configuration (e.g. a shorter removal delay).
    pub fn with_blocks(mut blocks: BlockList) -> Self {
        for _ in 0..INITIAL_BLOCKS {
            blocks.add_block();
        }
        Self {
            title: String::new(),
            targets: String::new(),
            blocks,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Raw comma-separated target input, exactly as typed.
    pub fn targets_input(&self) -> &str {
        &self.targets
    }

    pub fn set_targets(&mut self, raw: impl Into<String>) {
        self.targets = raw.into();
    }

    pub fn target_ids(&self) -> Vec<String> {
        parse_target_ids(&self.targets)
    }

    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockList {
        &mut self.blocks
    }

    /// Back to the initial state: empty fields and two fresh blocks.
    ///
    /// Numbering restarts because the block list is replaced.
    pub fn reset(&mut self) {
        let delay = self.blocks.removal_delay();
        *self = Self::with_blocks(BlockList::new().with_removal_delay(delay));
    }
}

/// Split comma-separated ids, trimming whitespace and dropping empty entries.
///
/// Order and duplicates are preserved.
pub fn parse_target_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
