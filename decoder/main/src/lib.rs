//! # localgen-decoder
//!
//! Batch-generates text completions for an ordered list of prompts using a
//! locally-resident pretrained causal language model. This is the decoder
//! backend of an evaluation harness: the harness hands over prompts and a
//! model identifier, and gets back one completion string per prompt, in the
//! original prompt order.
//!
//! With `batch_size > 1` prompts are sorted by length before batching so
//! that similarly long prompts share a batch and padding work is minimized;
//! the permutation is inverted before returning, so callers never observe
//! the reordering.
//!
//! ## Example
//!
//! ```rust,ignore
//! use localgen_decoder::{complete_local, DecodeOptions};
//!
//! let prompts = vec!["Hi".to_string(), "Tell me a story".to_string()];
//! let options = DecodeOptions::default().with_batch_size(4);
//! let completions = complete_local(&prompts, "mistralai/Mistral-7B-v0.1", &options)?;
//! assert_eq!(completions.len(), prompts.len());
//! ```

pub mod api;
pub(crate) mod core;
pub mod spi;
mod saf;

pub use saf::*;
