//! Spending a section's leftover budget on connectors and surrounding text.

use passage_core::{DocumentText, Tokenizer};
use tracing::trace;

use super::types::{Chunk, Section, CONNECTOR, CONTEXT_CHARS_PER_TOKEN, MIN_EXPANSION_BUDGET};

pub(crate) struct ContextExpander<'d> {
    doc: &'d DocumentText,
    tokenizer: &'d dyn Tokenizer,
    max_tokens: usize,
    connector_tokens: usize,
}

impl<'d> ContextExpander<'d> {
    pub(crate) fn new(
        doc: &'d DocumentText,
        tokenizer: &'d dyn Tokenizer,
        max_tokens: usize,
    ) -> Self {
        Self {
            doc,
            tokenizer,
            max_tokens,
            connector_tokens: tokenizer.count(CONNECTOR),
        }
    }

    pub(crate) fn connector_tokens(&self) -> usize {
        self.connector_tokens
    }

    /// Join the section's chunks with connectors, then grow its edges into the
    /// neighbouring document text until the budget is used up.
    ///
    /// The section score is left untouched; added text carries a score of zero.
    pub(crate) fn expand(&self, section: &mut Section<'_>) {
        self.insert_connectors(section);

        let mut budget = self.max_tokens.saturating_sub(section.token_count);
        if budget <= MIN_EXPANSION_BUDGET {
            return;
        }
        let (Some(first), Some(last)) = (section.chunks.first(), section.chunks.last()) else {
            return;
        };
        let section_start = first.start_pos;
        let section_end = last.end_pos;
        let touches_end = section_end + 1 >= self.doc.char_len();

        if section_start > 0 {
            let before_budget = if touches_end { budget } else { budget.div_ceil(2) };
            if let Some(chunk) = self.context_before(section_start, before_budget) {
                budget -= chunk.token_count;
                section.token_count += chunk.token_count;
                section.chunks.insert(0, chunk);
            }
        }

        if !touches_end {
            if let Some(chunk) = self.context_after(section_end, budget) {
                section.token_count += chunk.token_count;
                section.chunks.push(chunk);
            }
        }
    }

    fn insert_connectors(&self, section: &mut Section<'_>) {
        let gaps = section.chunks.len().saturating_sub(1);
        if gaps == 0 {
            return;
        }
        let mut joined = Vec::with_capacity(section.chunks.len() + gaps);
        for (i, chunk) in section.chunks.drain(..).enumerate() {
            if i > 0 {
                joined.push(Chunk::connector(self.connector_tokens));
            }
            joined.push(chunk);
        }
        section.chunks = joined;
        section.token_count += gaps * self.connector_tokens;
    }

    /// The last `budget` tokens of the text before character `section_start`.
    fn context_before(&self, section_start: usize, budget: usize) -> Option<Chunk<'static>> {
        let window_start = section_start.saturating_sub(budget * CONTEXT_CHARS_PER_TOKEN);
        let tokens = self.tokenizer.encode(self.doc.slice(window_start, section_start));
        let take = tokens.len().min(budget);
        if take == 0 {
            return None;
        }
        let text = self.tokenizer.decode(&tokens[tokens.len() - take..]);
        let start_pos = section_start.saturating_sub(text.chars().count());
        trace!(tokens = take, start_pos, "context before section");
        Some(Chunk::context(text, start_pos, section_start - 1, take))
    }

    /// The first `budget` tokens of the text after character `section_end`.
    fn context_after(&self, section_end: usize, budget: usize) -> Option<Chunk<'static>> {
        let window_start = section_end + 1;
        let window_end = window_start + budget * CONTEXT_CHARS_PER_TOKEN;
        let tokens = self.tokenizer.encode(self.doc.slice(window_start, window_end));
        let take = tokens.len().min(budget);
        if take == 0 {
            return None;
        }
        let text = self.tokenizer.decode(&tokens[..take]);
        let end_pos = section_end + text.chars().count().max(1);
        trace!(tokens = take, end_pos, "context after section");
        Some(Chunk::context(text, window_start, end_pos, take))
    }
}
