//! Public configuration types for completion decoding

use localgen_tokenizer::PaddingSide;
use std::path::PathBuf;

/// Weight precision requested for model loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Half precision on an accelerator, full precision otherwise.
    #[default]
    Auto,
    /// 32-bit weights.
    Full,
    /// 16-bit weights. Forced back to `Full` on hosts without an
    /// accelerator, where reduced-precision kernels may be unavailable.
    Half,
}

/// Generation options forwarded to the underlying pipeline.
///
/// `extra` is an open-ended bag passed through verbatim; pipelines interpret
/// the keys they recognize and ignore the rest.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Maximum number of new tokens per completion
    pub max_new_tokens: usize,
    /// Sampling temperature (ignored under greedy decoding)
    pub temperature: Option<f64>,
    /// Top-k sampling: keep only the k most likely tokens
    pub top_k: Option<usize>,
    /// Nucleus (top-p) sampling
    pub top_p: Option<f64>,
    /// Repetition penalty over already generated tokens (1.0 = no penalty)
    pub repeat_penalty: f32,
    /// RNG seed for sampling; drawn at random when unset
    pub seed: Option<u64>,
    /// Pass-through options forwarded verbatim to the pipeline
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: None,
            top_k: None,
            top_p: None,
            repeat_penalty: 1.0,
            seed: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Options for one `complete` invocation.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Sample from the model distribution instead of greedy decoding
    pub do_sample: bool,
    /// Number of prompts per generation batch (must be >= 1)
    pub batch_size: usize,
    /// Cache directory for model artifacts; the hub default when unset
    pub cache_dir: Option<PathBuf>,
    /// Weight precision for model loading
    pub precision: Precision,
    /// Allow reduced-precision matrix multiplication on the accelerator.
    /// Carried as an explicit per-call value so no process-wide numeric
    /// state is mutated behind the caller's back.
    pub reduced_precision_matmul: bool,
    /// Generation options forwarded to the pipeline
    pub generation: GenerationParams,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            do_sample: false,
            batch_size: 1,
            cache_dir: None,
            precision: Precision::Auto,
            reduced_precision_matmul: true,
            generation: GenerationParams::default(),
        }
    }
}

impl DecodeOptions {
    pub fn with_do_sample(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }
}

/// Loading configuration handed to the model provider, with precision
/// already resolved against the host's hardware.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub cache_dir: Option<PathBuf>,
    /// Resolved precision; never `Auto`.
    pub precision: Precision,
    pub reduced_precision_matmul: bool,
    pub padding_side: PaddingSide,
}

impl LoadOptions {
    /// Resolve loading options for the host. Without an accelerator,
    /// reduced-precision loading is forced off even when explicitly
    /// requested: quantized and half-precision kernels may be unavailable
    /// or incorrect on CPU-only hosts.
    pub fn resolve(options: &DecodeOptions, accelerator: bool) -> Self {
        let precision = if accelerator {
            match options.precision {
                Precision::Auto => Precision::Half,
                explicit => explicit,
            }
        } else {
            Precision::Full
        };

        Self {
            cache_dir: options.cache_dir.clone(),
            precision,
            reduced_precision_matmul: options.reduced_precision_matmul && accelerator,
            padding_side: PaddingSide::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_host_forces_full_precision() {
        let options = DecodeOptions::default().with_precision(Precision::Half);
        let load = LoadOptions::resolve(&options, false);
        assert_eq!(load.precision, Precision::Full);
    }

    #[test]
    fn cpu_host_disables_reduced_precision_matmul() {
        let options = DecodeOptions::default();
        assert!(options.reduced_precision_matmul);
        let load = LoadOptions::resolve(&options, false);
        assert!(!load.reduced_precision_matmul);
    }

    #[test]
    fn auto_precision_resolves_by_hardware() {
        let options = DecodeOptions::default();
        assert_eq!(LoadOptions::resolve(&options, true).precision, Precision::Half);
        assert_eq!(LoadOptions::resolve(&options, false).precision, Precision::Full);
    }

    #[test]
    fn explicit_precision_kept_on_accelerator() {
        let options = DecodeOptions::default().with_precision(Precision::Full);
        assert_eq!(LoadOptions::resolve(&options, true).precision, Precision::Full);
    }

    #[test]
    fn padding_is_always_left() {
        let load = LoadOptions::resolve(&DecodeOptions::default(), true);
        assert_eq!(load.padding_side, PaddingSide::Left);
    }
}
