//! Chunk and section types used while assembling passages.

use std::borrow::Cow;

use passage_core::RenderedSection;

// ── Constants ───────────────────────────────────────────────────────────────

/// Separator placed between non-adjacent chunks of an expanded section.
pub const CONNECTOR: &str = "\n\n...\n\n";

/// Leftover budget at or below this many tokens is not spent on context.
pub const MIN_EXPANSION_BUDGET: usize = 40;

/// Characters of surrounding text encoded per token of expansion budget.
pub const CONTEXT_CHARS_PER_TOKEN: usize = 8;

// ── Options ─────────────────────────────────────────────────────────────────

/// Parameters of a ranked render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionOptions {
    /// Token budget per section.
    pub max_tokens: usize,
    /// Maximum number of sections returned.
    pub max_sections: usize,
    /// Widen sections with surrounding document text.
    pub overlapping_chunks: bool,
}

impl SectionOptions {
    pub fn new(max_tokens: usize, max_sections: usize) -> Self {
        Self {
            max_tokens,
            max_sections,
            overlapping_chunks: true,
        }
    }

    pub fn without_overlap(mut self) -> Self {
        self.overlapping_chunks = false;
        self
    }
}

impl From<&passage_core::config::RenderConfig> for SectionOptions {
    fn from(config: &passage_core::config::RenderConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            max_sections: config.max_sections,
            overlapping_chunks: config.overlapping_chunks,
        }
    }
}

// ── Chunks ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Text matched by the query.
    Hit,
    /// Separator between non-adjacent hits.
    Connector,
    /// Surrounding text added to fill the budget.
    Context,
}

/// A span of document text with its token count.
///
/// Positions are inclusive character offsets. Text cut straight from the document
/// borrows from it; text produced by decoding or merging is owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<'a> {
    pub text: Cow<'a, str>,
    pub start_pos: usize,
    pub end_pos: usize,
    pub score: f64,
    pub token_count: usize,
    pub kind: ChunkKind,
}

impl<'a> Chunk<'a> {
    pub fn hit(
        text: impl Into<Cow<'a, str>>,
        start_pos: usize,
        end_pos: usize,
        score: f64,
        token_count: usize,
    ) -> Self {
        Self {
            text: text.into(),
            start_pos,
            end_pos,
            score,
            token_count,
            kind: ChunkKind::Hit,
        }
    }

    pub(crate) fn connector(token_count: usize) -> Self {
        Self {
            text: Cow::Borrowed(CONNECTOR),
            start_pos: 0,
            end_pos: 0,
            score: 0.0,
            token_count,
            kind: ChunkKind::Connector,
        }
    }

    pub(crate) fn context(text: String, start_pos: usize, end_pos: usize, token_count: usize) -> Self {
        Self {
            text: Cow::Owned(text),
            start_pos,
            end_pos,
            score: 0.0,
            token_count,
            kind: ChunkKind::Context,
        }
    }

    /// True when `next` starts on the character right after this chunk ends.
    pub fn is_followed_by(&self, next: &Chunk<'_>) -> bool {
        self.end_pos + 1 == next.start_pos
    }
}

// ── Sections ────────────────────────────────────────────────────────────────

/// A group of chunks rendered as one contiguous block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub chunks: Vec<Chunk<'a>>,
    /// Mean score of the member hits, fixed when the section is closed.
    pub score: f64,
    pub token_count: usize,
}

impl Section<'_> {
    pub fn text(&self) -> String {
        self.chunks.iter().map(|c| c.text.as_ref()).collect()
    }

    pub fn render(&self) -> RenderedSection {
        RenderedSection {
            text: self.text(),
            token_count: self.token_count,
            score: self.score,
        }
    }
}
