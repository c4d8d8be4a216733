//! Error types for tokenizer operations

use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur in tokenizer operations
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
