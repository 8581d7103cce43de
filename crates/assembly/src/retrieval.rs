//! Ranking matched documents and rendering their content for a prompt.

use passage_core::config::SearchConfig;
use passage_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::result::DocumentResult;

/// Placed between the sections of one document's rendered content.
pub const CONTENT_SEPARATOR: &str = "\n...\n";

/// A matched document with its rendered content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatch {
    pub uri: String,
    pub content: String,
    pub score: f64,
}

/// Drop results scoring below `min_score`, order the rest best first and keep `top_k`.
///
/// Equal scores keep their incoming order.
pub fn rank_documents(
    mut results: Vec<DocumentResult>,
    top_k: usize,
    min_score: f64,
) -> Vec<DocumentResult> {
    let before = results.len();
    results.retain(|r| r.score() >= min_score);
    results.sort_by(|a, b| b.score().total_cmp(&a.score()));
    results.truncate(top_k);
    debug!(before, kept = results.len(), top_k, min_score, "ranked documents");
    results
}

/// Every matched section of a document, in document order, joined into one string.
pub async fn render_document_content(result: &DocumentResult, max_tokens: usize) -> Result<String> {
    let sections = result.render_all_sections(max_tokens).await?;
    Ok(sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTENT_SEPARATOR))
}

/// Rank `results` per `config` and render each kept document's content.
pub async fn render_matches(
    results: Vec<DocumentResult>,
    config: &SearchConfig,
) -> Result<Vec<DocumentMatch>> {
    let ranked = rank_documents(results, config.top_k, config.min_score);
    let mut matches = Vec::with_capacity(ranked.len());
    for result in &ranked {
        matches.push(DocumentMatch {
            uri: result.uri().to_string(),
            content: render_document_content(result, config.content_max_tokens).await?,
            score: result.score(),
        });
    }
    Ok(matches)
}
