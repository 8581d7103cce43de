use std::sync::Arc;

use passage_core::{DocumentText, RenderedSection, Result, ScoredHit, Tokenizer};
use tracing::debug;

use crate::section::{self, SectionOptions};
use crate::source::DocumentSource;

/// The hits one query produced against one document.
pub struct DocumentResult {
    source: Arc<dyn DocumentSource>,
    hits: Vec<ScoredHit>,
    tokenizer: Arc<dyn Tokenizer>,
    score: f64,
}

impl DocumentResult {
    /// Fails on any hit whose start lies after its end. Ranges are checked against
    /// the document once its text is loaded.
    pub fn new(
        source: Arc<dyn DocumentSource>,
        hits: Vec<ScoredHit>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self> {
        hits.iter().try_for_each(ScoredHit::validate)?;
        let score = if hits.is_empty() {
            0.0
        } else {
            hits.iter().map(|h| h.score).sum::<f64>() / hits.len() as f64
        };
        Ok(Self {
            source,
            hits,
            tokenizer,
            score,
        })
    }

    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn uri(&self) -> &str {
        self.source.uri()
    }

    pub fn hits(&self) -> &[ScoredHit] {
        &self.hits
    }

    /// Mean score of the hits; used to order documents against each other.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// All hits as sections of at most `max_tokens` tokens, in document order.
    pub async fn render_all_sections(&self, max_tokens: usize) -> Result<Vec<RenderedSection>> {
        let doc = DocumentText::new(self.source.load_text().await?);
        debug!(doc_id = %self.id(), hits = self.hits.len(), "rendering all sections");
        section::render_all_sections(&doc, &self.hits, self.tokenizer.as_ref(), max_tokens)
    }

    /// The `max_sections` best sections of at most `max_tokens` tokens, best first.
    /// With `overlapping_chunks`, each section is widened with surrounding text.
    pub async fn render_sections(
        &self,
        max_tokens: usize,
        max_sections: usize,
        overlapping_chunks: bool,
    ) -> Result<Vec<RenderedSection>> {
        let options = SectionOptions {
            max_tokens,
            max_sections,
            overlapping_chunks,
        };
        self.render_sections_with(&options).await
    }

    pub async fn render_sections_with(
        &self,
        options: &SectionOptions,
    ) -> Result<Vec<RenderedSection>> {
        let doc = DocumentText::new(self.source.load_text().await?);
        let document_tokens = self.source.get_length().await?;
        debug!(
            doc_id = %self.id(),
            hits = self.hits.len(),
            document_tokens,
            "rendering ranked sections"
        );
        section::render_ranked_sections(
            &doc,
            document_tokens,
            &self.hits,
            self.tokenizer.as_ref(),
            options,
        )
    }
}

impl std::fmt::Debug for DocumentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResult")
            .field("id", &self.id())
            .field("uri", &self.uri())
            .field("hits", &self.hits)
            .field("score", &self.score)
            .finish()
    }
}
