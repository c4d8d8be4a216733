//! # localgen-hub
//!
//! Model artifact resolution for localgen: resolves a model identifier
//! (a HuggingFace repo ID such as `openai-community/gpt2`) to locally
//! cached `config.json`, weight file(s) and `tokenizer.json`, downloading
//! through the HuggingFace Hub when they are not cached yet.
//!
//! ## Example
//!
//! ```rust,ignore
//! use localgen_hub::HubApi;
//!
//! let hub = HubApi::new();
//! let artifacts = match hub.get_cached("mistralai/Mistral-7B-v0.1") {
//!     Some(a) => a,
//!     None => hub.download_model_sync("mistralai/Mistral-7B-v0.1")?,
//! };
//! let config = artifacts.load_config_sync()?;
//! let weights = artifacts.weight_files()?;
//! ```

pub mod api;
pub(crate) mod core;
mod saf;

pub use saf::*;
