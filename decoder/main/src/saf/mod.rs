//! Stable API facade

pub use crate::api::error::{DecodeError, DecodeResult};
pub use crate::api::types::{DecodeOptions, GenerationParams, LoadOptions, Precision};
pub use crate::core::candle::CandleProvider;
pub use crate::core::decoder::{complete, complete_local};
pub use crate::core::device::accelerator_available;
pub use crate::spi::contract::{CausalModel, ModelProvider, PipelineError};
