//! Error types for completion decoding

use thiserror::Error;

/// Result type for completion decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding completions.
///
/// No retries happen internally; every failure surfaces to the caller
/// unmodified. The only local recoveries are the full-precision fallback on
/// hosts without an accelerator and the skipped optional acceleration probe.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The model or tokenizer could not be resolved or loaded.
    #[error("Resource load error: {0}")]
    ResourceLoadError(String),

    /// The underlying generation call failed (invalid option combination,
    /// out of memory, ...).
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// An incompatible option combination was requested.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
