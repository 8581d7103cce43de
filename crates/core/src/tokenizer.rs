//! Tokenizers used to measure and cut text by token count.

use std::sync::Arc;

use crate::error::{PassageError, Result};

/// Encodes text to tokens and back.
///
/// `decode(encode(text))` must reproduce `text`; decoding an arbitrary slice of a
/// token sequence may lose a little at the slice edges.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn decode(&self, tokens: &[u32]) -> String;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    fn name(&self) -> &str;
}

/// One token per Unicode scalar value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.chars().map(u32::from).collect()
    }

    fn decode(&self, tokens: &[u32]) -> String {
        tokens.iter().filter_map(|&t| char::from_u32(t)).collect()
    }

    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn name(&self) -> &str {
        "char"
    }
}

/// OpenAI `cl100k_base` byte-pair encoding.
#[cfg(feature = "tiktoken")]
pub struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tiktoken")]
impl TiktokenTokenizer {
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| PassageError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    fn try_decode(&self, tokens: &[u32]) -> Option<String> {
        self.bpe.decode(tokens.iter().map(|&t| t as _).collect()).ok()
    }
}

#[cfg(feature = "tiktoken")]
impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe
            .encode_with_special_tokens(text)
            .into_iter()
            .map(|t| t as u32)
            .collect()
    }

    fn decode(&self, tokens: &[u32]) -> String {
        if let Some(text) = self.try_decode(tokens) {
            return text;
        }
        // A cut through a multi-byte character leaves partial bytes at an edge.
        for lead in 0..=3usize {
            for tail in 0..=3usize {
                if lead + tail >= tokens.len() {
                    continue;
                }
                if let Some(text) = self.try_decode(&tokens[lead..tokens.len() - tail]) {
                    return text;
                }
            }
        }
        tracing::warn!(tokens = tokens.len(), "token slice could not be decoded");
        String::new()
    }

    fn name(&self) -> &str {
        "cl100k"
    }
}

/// Resolve a configured tokenizer name.
pub fn tokenizer_from_name(name: &str) -> Result<Arc<dyn Tokenizer>> {
    match name.to_lowercase().as_str() {
        "char" | "chars" => Ok(Arc::new(CharTokenizer)),
        #[cfg(feature = "tiktoken")]
        "cl100k" | "cl100k_base" => Ok(Arc::new(TiktokenTokenizer::cl100k()?)),
        other => Err(PassageError::Tokenizer(format!("unknown tokenizer: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_tokenizer_round_trips() {
        let tok = CharTokenizer;
        let text = "Grüße, world!\n";
        let tokens = tok.encode(text);
        assert_eq!(tokens.len(), 14);
        assert_eq!(tok.decode(&tokens), text);
        assert_eq!(tok.count(text), 14);
    }

    #[test]
    fn char_tokenizer_slices_decode_cleanly() {
        let tok = CharTokenizer;
        let tokens = tok.encode("abcdef");
        assert_eq!(tok.decode(&tokens[2..4]), "cd");
    }

    #[test]
    fn resolves_known_names() {
        assert_eq!(tokenizer_from_name("char").unwrap().name(), "char");
        assert_eq!(tokenizer_from_name("CHARS").unwrap().name(), "char");
        assert!(matches!(
            tokenizer_from_name("sentencepiece"),
            Err(PassageError::Tokenizer(_))
        ));
    }

    #[cfg(feature = "tiktoken")]
    #[test]
    fn cl100k_round_trips_and_repairs_slices() {
        let tok = TiktokenTokenizer::cl100k().unwrap();
        let text = "Passage assembly: Grüße aus Köln, 東京の天気は晴れ.";
        let tokens = tok.encode(text);
        assert!(tokens.len() < text.chars().count());
        assert_eq!(tok.count(text), tokens.len());
        assert_eq!(tok.decode(&tokens), text);

        // Cutting inside multi-byte characters must still decode to source text.
        for cut in 1..tokens.len() {
            let head = tok.decode(&tokens[..cut]);
            let tail = tok.decode(&tokens[cut..]);
            assert!(text.contains(head.as_str()), "head {head:?}");
            assert!(text.contains(tail.as_str()), "tail {tail:?}");
        }
        assert_eq!(tokenizer_from_name("cl100k_base").unwrap().name(), "cl100k");
    }
}
