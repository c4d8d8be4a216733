use crate::api::error::TokenizerResult;
use crate::api::types::PaddingSide;

/// Common tokenizer interface for prompt encoding and completion decoding.
pub trait PromptTokenizer {
    /// Encode text to token IDs.
    fn encode(&self, text: &str) -> TokenizerResult<Vec<u32>>;
    /// Decode token IDs to text.
    fn decode(&self, tokens: &[u32]) -> TokenizerResult<String>;
    /// Vocabulary size.
    fn vocab_size(&self) -> usize;
    /// Look up a special token by name, returning its ID if present.
    fn token_to_id(&self, token: &str) -> Option<u32>;
    /// The configured padding token, if any.
    fn pad_token_id(&self) -> Option<u32>;
    /// Set the padding token. Decoders configure it from the model's
    /// end-of-sequence token before batched generation.
    fn set_pad_token_id(&mut self, id: u32);
    /// Which side sequences are padded on when batched.
    fn padding_side(&self) -> PaddingSide;
}
