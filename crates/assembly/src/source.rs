//! Where a document's text comes from.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use passage_core::{Result, Tokenizer};
use tokio::sync::OnceCell;
use tracing::debug;

/// Supplies the full text of one document and its length in tokens.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn id(&self) -> &str;

    fn uri(&self) -> &str;

    /// The full raw text of the document.
    async fn load_text(&self) -> Result<Arc<str>>;

    /// Token length of the full text, measured with the document's tokenizer.
    async fn get_length(&self) -> Result<usize>;
}

// ── In-memory ───────────────────────────────────────────────────────

/// A document whose text is already in memory.
pub struct InMemoryDocument {
    id: String,
    uri: String,
    text: Arc<str>,
    tokenizer: Arc<dyn Tokenizer>,
    length: OnceLock<usize>,
}

impl InMemoryDocument {
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        text: impl Into<Arc<str>>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            text: text.into(),
            tokenizer,
            length: OnceLock::new(),
        }
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    async fn load_text(&self) -> Result<Arc<str>> {
        Ok(Arc::clone(&self.text))
    }

    async fn get_length(&self) -> Result<usize> {
        Ok(*self.length.get_or_init(|| self.tokenizer.count(&self.text)))
    }
}

// ── On disk ─────────────────────────────────────────────────────────

/// A document stored as a UTF-8 text file. Text and token length are read once
/// and cached.
pub struct LocalDocument {
    id: String,
    uri: String,
    path: PathBuf,
    tokenizer: Arc<dyn Tokenizer>,
    text: OnceCell<Arc<str>>,
    length: OnceCell<usize>,
}

impl LocalDocument {
    /// The document `id` stored as `<folder>/<id>.txt`.
    pub fn new(
        folder: impl AsRef<Path>,
        id: impl Into<String>,
        uri: impl Into<String>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        let id = id.into();
        let path = folder.as_ref().join(format!("{id}.txt"));
        Self::with_path(path, id, uri, tokenizer)
    }

    /// A standalone file, identified by its stem and addressed by its path.
    pub fn from_file(path: impl Into<PathBuf>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let uri = path.display().to_string();
        Self::with_path(path, id, uri, tokenizer)
    }

    fn with_path(
        path: PathBuf,
        id: String,
        uri: impl Into<String>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            id,
            uri: uri.into(),
            path,
            tokenizer,
            text: OnceCell::new(),
            length: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for LocalDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    async fn load_text(&self) -> Result<Arc<str>> {
        let text = self
            .text
            .get_or_try_init(|| async {
                let text = tokio::fs::read_to_string(&self.path).await?;
                debug!(path = %self.path.display(), chars = text.len(), "loaded document text");
                Ok::<_, passage_core::PassageError>(Arc::from(text))
            })
            .await?;
        Ok(Arc::clone(text))
    }

    async fn get_length(&self) -> Result<usize> {
        let length = self
            .length
            .get_or_try_init(|| async {
                let text = self.load_text().await?;
                Ok::<_, passage_core::PassageError>(self.tokenizer.count(&text))
            })
            .await?;
        Ok(*length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passage_core::{CharTokenizer, PassageError};

    #[tokio::test]
    async fn in_memory_reports_token_length() {
        let doc = InMemoryDocument::new("a", "mem://a", "hello", Arc::new(CharTokenizer));
        assert_eq!(doc.id(), "a");
        assert_eq!(&*doc.load_text().await.unwrap(), "hello");
        assert_eq!(doc.get_length().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn local_document_reads_id_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc1.txt"), "stored text").unwrap();

        let doc = LocalDocument::new(dir.path(), "doc1", "file:///doc1.md", Arc::new(CharTokenizer));
        assert_eq!(doc.uri(), "file:///doc1.md");
        assert_eq!(&*doc.load_text().await.unwrap(), "stored text");
        assert_eq!(doc.get_length().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn local_document_caches_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "first").unwrap();

        let doc = LocalDocument::from_file(&path, Arc::new(CharTokenizer));
        assert_eq!(doc.id(), "notes");
        assert_eq!(&*doc.load_text().await.unwrap(), "first");

        std::fs::write(&path, "second").unwrap();
        assert_eq!(&*doc.load_text().await.unwrap(), "first");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = LocalDocument::new(dir.path(), "absent", "absent", Arc::new(CharTokenizer));
        assert!(matches!(doc.load_text().await, Err(PassageError::Io(_))));
    }
}
