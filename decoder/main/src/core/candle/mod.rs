//! Candle-backed model provider

mod model;
mod provider;

pub use provider::CandleProvider;
