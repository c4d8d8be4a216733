//! # localgen-tokenizer
//!
//! Tokenization for localgen: the [`PromptTokenizer`] contract, a wrapper
//! around HuggingFace's `tokenizers` crate, and left-side batch padding for
//! causal generation.
//!
//! Batched causal generation needs every sequence in a batch to end at the
//! same position, so shorter sequences are padded on their *left*; the
//! [`pad_left`] helper builds such a batch together with its attention mask.

pub mod api;
pub(crate) mod core;
pub mod spi;
mod saf;

pub use saf::*;
