//! Turning scored hits into token-counted chunks.

use std::borrow::Cow;

use passage_core::{DocumentText, ScoredHit, Tokenizer};

use super::types::{Chunk, Section};

/// One chunk per hit, cutting any hit longer than `max_tokens` into consecutive
/// pieces of exactly `max_tokens` tokens (the last piece may be shorter).
///
/// Pieces inherit the hit's score. Their positions advance by the number of
/// characters each decoded piece covers, clamped to the hit's range.
pub(crate) fn split_hits<'a>(
    doc: &'a DocumentText,
    hits: &[ScoredHit],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
) -> Vec<Chunk<'a>> {
    let mut chunks = Vec::with_capacity(hits.len());

    for hit in hits {
        let text = doc.span(hit.start_pos, hit.end_pos);
        let tokens = tokenizer.encode(text);
        if tokens.len() <= max_tokens {
            chunks.push(Chunk::hit(text, hit.start_pos, hit.end_pos, hit.score, tokens.len()));
            continue;
        }

        let mut char_offset = 0usize;
        for piece in tokens.chunks(max_tokens) {
            let piece_text = tokenizer.decode(piece);
            let piece_chars = piece_text.chars().count();
            let start_pos = (hit.start_pos + char_offset).min(hit.end_pos);
            let end_pos = (start_pos + piece_chars)
                .saturating_sub(1)
                .clamp(start_pos, hit.end_pos);
            chunks.push(Chunk::hit(
                Cow::Owned(piece_text),
                start_pos,
                end_pos,
                hit.score,
                piece.len(),
            ));
            char_offset += piece_chars;
        }
    }

    chunks
}

/// One chunk per hit that fits in `max_tokens`, in document order.
///
/// Returns the kept chunks and how many hits were dropped for being too long.
pub(crate) fn filter_hits<'a>(
    doc: &'a DocumentText,
    hits: &[ScoredHit],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
) -> (Vec<Chunk<'a>>, usize) {
    let mut dropped = 0usize;
    let mut chunks: Vec<Chunk<'a>> = hits
        .iter()
        .filter_map(|hit| {
            let text = doc.span(hit.start_pos, hit.end_pos);
            let token_count = tokenizer.count(text);
            if token_count > max_tokens {
                dropped += 1;
                return None;
            }
            Some(Chunk::hit(text, hit.start_pos, hit.end_pos, hit.score, token_count))
        })
        .collect();
    sort_by_position(&mut chunks);
    (chunks, dropped)
}

/// Stable sort into document order.
pub(crate) fn sort_by_position(chunks: &mut [Chunk<'_>]) {
    chunks.sort_by_key(|c| c.start_pos);
}

/// The first `max_tokens` tokens of the best-scoring hit, as a single section.
///
/// On equal scores the earliest hit in the list wins.
pub(crate) fn truncate_top_hit<'a>(
    doc: &'a DocumentText,
    hits: &[ScoredHit],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
) -> Option<Section<'a>> {
    let top = hits.iter().fold(None::<&ScoredHit>, |best, hit| match best {
        Some(b) if b.score >= hit.score => Some(b),
        _ => Some(hit),
    })?;

    let tokens = tokenizer.encode(doc.span(top.start_pos, top.end_pos));
    let kept = &tokens[..tokens.len().min(max_tokens)];
    let text = tokenizer.decode(kept);
    let end_pos = (top.start_pos + text.chars().count())
        .saturating_sub(1)
        .clamp(top.start_pos, top.end_pos);

    Some(Section {
        chunks: vec![Chunk::hit(
            Cow::Owned(text),
            top.start_pos,
            end_pos,
            top.score,
            kept.len(),
        )],
        score: top.score,
        token_count: kept.len(),
    })
}
