//! Facade re-exports for localgen-tokenizer

pub use crate::api::error::*;
pub use crate::api::types::*;
pub use crate::core::batch::{pad_left, PaddedBatch};
pub use crate::core::hf::HfTokenizer;
pub use crate::spi::contract::PromptTokenizer;
