use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassageError {
    #[error("Invalid hit [{start_pos}, {end_pos}]: {reason}")]
    InvalidHit {
        start_pos: usize,
        end_pos: usize,
        reason: String,
    },

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for PassageError {
    fn from(e: serde_json::Error) -> Self {
        PassageError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PassageError>;
