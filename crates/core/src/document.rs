use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{PassageError, Result};

/// A query hit inside a document: inclusive character range `[start_pos, end_pos]`
/// plus the relevance score assigned by the upstream search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoredHit {
    pub start_pos: usize,
    pub end_pos: usize,
    pub score: f64,
}

impl ScoredHit {
    pub fn new(start_pos: usize, end_pos: usize, score: f64) -> Self {
        Self {
            start_pos,
            end_pos,
            score,
        }
    }

    /// Reject inverted ranges.
    pub fn validate(&self) -> Result<()> {
        if self.start_pos > self.end_pos {
            return Err(PassageError::InvalidHit {
                start_pos: self.start_pos,
                end_pos: self.end_pos,
                reason: "start_pos is greater than end_pos".to_string(),
            });
        }
        Ok(())
    }

    /// Reject ranges that reach past the end of a document of `char_len` characters.
    pub fn validate_within(&self, char_len: usize) -> Result<()> {
        self.validate()?;
        if self.end_pos >= char_len {
            return Err(PassageError::InvalidHit {
                start_pos: self.start_pos,
                end_pos: self.end_pos,
                reason: format!("range exceeds document length of {char_len} characters"),
            });
        }
        Ok(())
    }
}

/// A rendered span of document text, ready to be placed into a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedSection {
    pub text: String,
    pub token_count: usize,
    pub score: f64,
}

/// The canonical text buffer of one document.
///
/// Positions handed around the pipeline are character offsets; this type owns the
/// string once and maps character ranges back to byte ranges on demand.
#[derive(Debug, Clone)]
pub struct DocumentText {
    text: Arc<str>,
    /// Byte offset of every character, followed by `text.len()`.
    char_starts: Vec<usize>,
}

impl DocumentText {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let mut char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        char_starts.push(text.len());
        Self { text, char_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Number of characters in the document.
    pub fn char_len(&self) -> usize {
        self.char_starts.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Characters `[start, end)`, clamped to the document.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let len = self.char_len();
        let end = end.min(len);
        let start = start.min(end);
        &self.text[self.char_starts[start]..self.char_starts[end]]
    }

    /// Characters `[start_pos, end_pos]`, inclusive on both ends.
    pub fn span(&self, start_pos: usize, end_pos: usize) -> &str {
        self.slice(start_pos, end_pos.saturating_add(1))
    }

    /// Everything before character `pos`.
    pub fn before(&self, pos: usize) -> &str {
        self.slice(0, pos)
    }

    /// Everything after character `pos`.
    pub fn after(&self, pos: usize) -> &str {
        self.slice(pos.saturating_add(1), self.char_len())
    }
}
