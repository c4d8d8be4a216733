//! HuggingFace Tokenizer wrapper

use crate::api::error::{TokenizerError, TokenizerResult};
use crate::api::types::PaddingSide;
use crate::spi::contract::PromptTokenizer;

/// HuggingFace Tokenizer wrapper (uses the `tokenizers` crate).
///
/// Supports all tokenizer formats loadable by HuggingFace: BPE,
/// SentencePiece, WordPiece, etc. Load from a `tokenizer.json` file.
///
/// The pad token starts unset; decoders configure it from the model's
/// end-of-sequence token before batched generation.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    pad_token_id: Option<u32>,
    padding_side: PaddingSide,
}

impl HfTokenizer {
    /// Load from a `tokenizer.json` file with the given padding side.
    pub fn from_file<P: AsRef<std::path::Path>>(
        path: P,
        padding_side: PaddingSide,
    ) -> TokenizerResult<Self> {
        let p = path.as_ref();
        let tokenizer = tokenizers::Tokenizer::from_file(p).map_err(|e| {
            TokenizerError::TokenizerError(format!(
                "Failed to load tokenizer file: {}: {}",
                p.display(),
                e
            ))
        })?;
        Ok(Self {
            inner: tokenizer,
            pad_token_id: None,
            padding_side,
        })
    }
}

impl PromptTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> TokenizerResult<Vec<u32>> {
        let encoding = self.inner.encode(text, false).map_err(|e| {
            TokenizerError::TokenizerError(format!("Tokenizer encode failed: {}", e))
        })?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[u32]) -> TokenizerResult<String> {
        self.inner.decode(tokens, true).map_err(|e| {
            TokenizerError::TokenizerError(format!("Tokenizer decode failed: {}", e))
        })
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.inner.token_to_id(token)
    }

    fn pad_token_id(&self) -> Option<u32> {
        self.pad_token_id
    }

    fn set_pad_token_id(&mut self, id: u32) {
        self.pad_token_id = Some(id);
    }

    fn padding_side(&self) -> PaddingSide {
        self.padding_side
    }
}
