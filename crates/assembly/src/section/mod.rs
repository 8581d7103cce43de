//! Passage assembly: turning a document's query hits into budgeted text sections.
//!
//! Hits are cut into token-counted chunks, packed in document order into sections
//! that fit a token budget, and rendered either all in document order or ranked by
//! score with adjacent chunks merged and surrounding context added.

mod assemble;
mod expand;
mod merge;
mod normalize;
mod rank;
mod types;

pub use types::{
    Chunk, ChunkKind, Section, SectionOptions, CONNECTOR, CONTEXT_CHARS_PER_TOKEN,
    MIN_EXPANSION_BUDGET,
};


use passage_core::{DocumentText, PassageError, RenderedSection, Result, ScoredHit, Tokenizer};
use tracing::{debug, warn};

use assemble::assemble_sections;
use expand::ContextExpander;
use merge::merge_adjacent;
use normalize::{filter_hits, sort_by_position, split_hits, truncate_top_hit};
use rank::rank_sections;

fn check_max_tokens(max_tokens: usize) -> Result<()> {
    if max_tokens == 0 {
        return Err(PassageError::InvalidBudget("max_tokens must be at least 1".to_string()));
    }
    Ok(())
}

fn check_hits(doc: &DocumentText, hits: &[ScoredHit]) -> Result<()> {
    let len = doc.char_len();
    hits.iter().try_for_each(|hit| hit.validate_within(len))
}

/// Every hit rendered into sections of at most `max_tokens` tokens, in document order.
///
/// Hits longer than the budget are cut into budget-sized pieces. Overlapping hits
/// are kept as they are, so overlapping text appears more than once.
pub fn render_all_sections(
    doc: &DocumentText,
    hits: &[ScoredHit],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
) -> Result<Vec<RenderedSection>> {
    check_max_tokens(max_tokens)?;
    check_hits(doc, hits)?;

    let mut chunks = split_hits(doc, hits, tokenizer, max_tokens);
    sort_by_position(&mut chunks);
    let chunk_count = chunks.len();
    let sections = assemble_sections(chunks, max_tokens, None);
    debug!(max_tokens, chunks = chunk_count, sections = sections.len(), "rendered all sections");

    Ok(sections.iter().map(Section::render).collect())
}

/// The `max_sections` most relevant sections of the document, best first.
///
/// `document_tokens` is the token length of the whole document; when it fits in
/// `max_tokens` the whole document is returned as one section with score 1.0.
///
/// With `overlapping_chunks`, hits separated by a gap also pay for the connector
/// between them, so the same hits can be grouped into more sections than without.
pub fn render_ranked_sections(
    doc: &DocumentText,
    document_tokens: usize,
    hits: &[ScoredHit],
    tokenizer: &dyn Tokenizer,
    options: &SectionOptions,
) -> Result<Vec<RenderedSection>> {
    let max_tokens = options.max_tokens;
    check_max_tokens(max_tokens)?;
    if options.max_sections == 0 {
        return Err(PassageError::InvalidBudget("max_sections must be at least 1".to_string()));
    }

    if document_tokens <= max_tokens {
        debug!(document_tokens, max_tokens, "whole document fits in budget");
        return Ok(vec![RenderedSection {
            text: doc.as_str().to_string(),
            token_count: document_tokens,
            score: 1.0,
        }]);
    }

    check_hits(doc, hits)?;
    let (chunks, dropped) = filter_hits(doc, hits, tokenizer, max_tokens);
    if dropped > 0 {
        warn!(dropped, max_tokens, "hits longer than the section budget were dropped");
    }
    if chunks.is_empty() {
        if !hits.is_empty() {
            warn!(max_tokens, "no hit fits the budget, truncating the best hit");
        }
        return Ok(truncate_top_hit(doc, hits, tokenizer, max_tokens)
            .map(|section| vec![section.render()])
            .unwrap_or_default());
    }

    let expander = options
        .overlapping_chunks
        .then(|| ContextExpander::new(doc, tokenizer, max_tokens));
    let connector = expander.as_ref().map(ContextExpander::connector_tokens);

    let mut sections = assemble_sections(chunks, max_tokens, connector);
    let assembled = sections.len();
    rank_sections(&mut sections, options.max_sections);

    for section in &mut sections {
        merge_adjacent(section);
        if let Some(expander) = &expander {
            expander.expand(section);
        }
    }
    debug!(
        max_tokens,
        assembled,
        kept = sections.len(),
        overlapping = options.overlapping_chunks,
        "rendered ranked sections"
    );

    Ok(sections.iter().map(Section::render).collect())
}
