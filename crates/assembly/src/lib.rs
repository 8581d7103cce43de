//! Passage assembly for retrieval: turns a document's scored hits into ranked,
//! token-budgeted sections of text for a language model prompt.

pub mod result;
pub mod retrieval;
pub mod section;
pub mod source;

pub use result::DocumentResult;
pub use retrieval::{
    rank_documents, render_document_content, render_matches, DocumentMatch, CONTENT_SEPARATOR,
};
pub use section::{render_all_sections, render_ranked_sections, SectionOptions, CONNECTOR};
pub use source::{DocumentSource, InMemoryDocument, LocalDocument};
