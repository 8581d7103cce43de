pub mod config;
pub mod document;
pub mod error;
pub mod tokenizer;

pub use config::PassageConfig;
pub use document::*;
pub use error::*;
pub use tokenizer::{tokenizer_from_name, CharTokenizer, Tokenizer};

#[cfg(feature = "tiktoken")]
pub use tokenizer::TiktokenTokenizer;
