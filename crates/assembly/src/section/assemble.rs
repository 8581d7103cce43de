//! Greedy packing of document-ordered chunks into budgeted sections.

use super::types::{Chunk, Section};

/// Running state of the section being filled.
#[derive(Default)]
struct SectionBuilder<'a> {
    chunks: Vec<Chunk<'a>>,
    score_sum: f64,
    token_count: usize,
    /// Tokens held back for connectors this section will need once expanded.
    connector_tokens: usize,
}

impl<'a> SectionBuilder<'a> {
    fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Tokens `chunk` would add, counting a connector if it leaves a gap.
    fn cost_of(&self, chunk: &Chunk<'_>, connector: Option<usize>) -> usize {
        match (self.chunks.last(), connector) {
            (Some(last), Some(cost)) if !last.is_followed_by(chunk) => chunk.token_count + cost,
            _ => chunk.token_count,
        }
    }

    fn push(&mut self, chunk: Chunk<'a>, cost: usize) {
        self.score_sum += chunk.score;
        self.token_count += chunk.token_count;
        self.connector_tokens += cost - chunk.token_count;
        self.chunks.push(chunk);
    }

    fn close(self) -> Section<'a> {
        let score = self.score_sum / self.chunks.len() as f64;
        Section {
            chunks: self.chunks,
            score,
            token_count: self.token_count,
        }
    }
}

/// Pack `chunks` (already in document order, each within budget) into sections of
/// at most `max_tokens` tokens, in a single left-to-right pass.
///
/// A chunk that exactly fills the remaining budget joins the current section. When
/// `connector` is set, every gap between consecutive chunks is charged that many
/// tokens so the section still fits after connectors are inserted.
pub(crate) fn assemble_sections<'a>(
    chunks: Vec<Chunk<'a>>,
    max_tokens: usize,
    connector: Option<usize>,
) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut current = SectionBuilder::default();

    for chunk in chunks {
        let mut cost = current.cost_of(&chunk, connector);
        let used = current.token_count + current.connector_tokens;
        if !current.is_empty() && used + cost > max_tokens {
            sections.push(std::mem::take(&mut current).close());
            cost = chunk.token_count;
        }
        current.push(chunk, cost);
    }

    if !current.is_empty() {
        sections.push(current.close());
    }
    sections
}
