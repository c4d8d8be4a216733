//! Provider contract for text generation pipelines

use crate::api::error::DecodeError;
use crate::api::types::{GenerationParams, LoadOptions};
use localgen_tokenizer::PromptTokenizer;
use thiserror::Error;

/// Errors raised by pipeline implementations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The model or tokenizer could not be resolved or loaded.
    #[error("Resource load error: {0}")]
    ResourceLoad(String),

    /// The underlying generation call failed.
    #[error("Generation error: {0}")]
    Generation(String),

    /// The requested capability is not available for this model or host.
    /// Callers probing an optional capability may treat this as a skip.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<PipelineError> for DecodeError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ResourceLoad(msg) => DecodeError::ResourceLoadError(msg),
            PipelineError::Generation(msg) => DecodeError::GenerationError(msg),
            PipelineError::Unsupported(msg) => DecodeError::GenerationError(msg),
        }
    }
}

/// A loaded causal language model ready for batched generation.
pub trait CausalModel {
    /// End-of-sequence token id declared by the model, when known.
    fn eos_token_id(&self) -> Option<u32>;

    /// Attempt to switch the model to a faster attention implementation.
    ///
    /// Returns `PipelineError::Unsupported` when the model or host cannot
    /// be accelerated; callers probe this and fall back silently.
    fn accelerate(&mut self) -> Result<(), PipelineError>;

    /// Generate ranked completion candidates for each prompt.
    ///
    /// Returns one candidate list per prompt, in prompt order, best first.
    /// Candidates contain only the newly generated text, never the prompt.
    fn generate(
        &mut self,
        tokenizer: &dyn PromptTokenizer,
        prompts: &[String],
        params: &GenerationParams,
        do_sample: bool,
        batch_size: usize,
    ) -> Result<Vec<Vec<String>>, PipelineError>;
}

/// Resolves model names into loaded tokenizers and models.
pub trait ModelProvider {
    fn load_tokenizer(
        &self,
        model_name: &str,
        options: &LoadOptions,
    ) -> Result<Box<dyn PromptTokenizer>, PipelineError>;

    fn load_model(
        &self,
        model_name: &str,
        options: &LoadOptions,
    ) -> Result<Box<dyn CausalModel>, PipelineError>;
}
