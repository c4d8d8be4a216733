mod pipeline;

pub use pipeline::{CausalModel, ModelProvider, PipelineError};
