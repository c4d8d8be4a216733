//! Candle causal model wrapper with batched generation over
//! equal-length row groups.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::llama::{self, Llama, LlamaConfig};
use candle_transformers::models::mistral;
use candle_transformers::utils::apply_repeat_penalty;

use crate::api::types::{GenerationParams, LoadOptions, Precision};
use crate::core::device::select_device;
use crate::spi::contract::{CausalModel, PipelineError};
use localgen_hub::ModelArtifacts;
use localgen_tokenizer::{pad_left, PaddedBatch, PromptTokenizer};

use std::collections::BTreeMap;
use std::path::PathBuf;

/// The concrete transformer behind a loaded model.
enum Arch {
    Llama { model: Llama, config: llama::Config },
    Mistral { model: mistral::Model },
}

/// Per-batch attention state. Llama keys the KV cache externally; Mistral
/// keeps it inside the model and only needs a reset between batches.
enum BatchState {
    Llama(llama::Cache),
    Mistral,
}

/// A candle-backed causal language model.
pub struct CandleModel {
    arch: Arch,
    device: Device,
    dtype: DType,
    eos_tokens: Vec<u32>,
    raw_config: serde_json::Value,
    weight_files: Vec<PathBuf>,
    fast_attention: bool,
}

impl CandleModel {
    pub fn load(artifacts: &ModelArtifacts, options: &LoadOptions) -> Result<Self, PipelineError> {
        let device = select_device().map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
        let dtype = match options.precision {
            Precision::Half => DType::F16,
            Precision::Full | Precision::Auto => DType::F32,
        };

        #[cfg(feature = "cuda")]
        if device.is_cuda() && options.reduced_precision_matmul {
            candle_core::cuda::set_gemm_reduced_precision_f32(true);
            candle_core::cuda::set_gemm_reduced_precision_bf16(true);
        }

        let raw_config = artifacts
            .load_config_sync()
            .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
        let weight_files = artifacts
            .weight_files()
            .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
        if let Ok(size) = artifacts.weights_size() {
            log::info!(
                "Loading {} ({:.2} GB of weights, dtype {:?}) on {:?}",
                artifacts.model_id,
                size as f64 / 1e9,
                dtype,
                device
            );
        }

        let eos_tokens = parse_eos_tokens(&raw_config);
        let arch = build_arch(&raw_config, &weight_files, dtype, &device, false)?;

        Ok(Self {
            arch,
            device,
            dtype,
            eos_tokens,
            raw_config,
            weight_files,
            fast_attention: false,
        })
    }

    fn begin_batch(&mut self) -> Result<BatchState, PipelineError> {
        match &mut self.arch {
            Arch::Llama { config, .. } => {
                let cache = llama::Cache::new(true, self.dtype, config, &self.device)
                    .map_err(|e| PipelineError::Generation(e.to_string()))?;
                Ok(BatchState::Llama(cache))
            }
            Arch::Mistral { model } => {
                model.clear_kv_cache();
                Ok(BatchState::Mistral)
            }
        }
    }

    /// Run the model over `input` at sequence offset `offset`. Returns
    /// f32 logits for the last position, shape `[rows, vocab]`.
    fn forward(
        &mut self,
        input: &Tensor,
        offset: usize,
        state: &mut BatchState,
    ) -> candle_core::Result<Tensor> {
        match (&mut self.arch, state) {
            (Arch::Llama { model, .. }, BatchState::Llama(cache)) => {
                model.forward(input, offset, cache)
            }
            (Arch::Mistral { model }, BatchState::Mistral) => {
                model.forward(input, offset)?.squeeze(1)?.to_dtype(DType::F32)
            }
            _ => candle_core::bail!("batch state does not match model architecture"),
        }
    }

    fn generate_batch(
        &mut self,
        batch: &PaddedBatch,
        samplers: &mut [LogitsProcessor],
        params: &GenerationParams,
        pad_id: u32,
    ) -> Result<Vec<Vec<u32>>, PipelineError> {
        let rows = batch.rows();
        let padded_len = batch.padded_len();
        if rows == 0 || padded_len == 0 {
            return Ok(vec![Vec::new(); rows]);
        }

        // The forward calls have no attention-mask input, so a batch must
        // not contain padding: pad tokens would be attended to as context
        // and shift the positions of shorter rows.
        if batch.attention_mask.iter().flatten().any(|&bit| bit == 0) {
            return Err(PipelineError::Generation(
                "rows of different length in one forward batch".to_string(),
            ));
        }

        let mut state = self.begin_batch()?;

        let flat: Vec<u32> = batch.input_ids.iter().flatten().copied().collect();
        let input = Tensor::from_vec(flat, (rows, padded_len), &self.device)
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let mut logits = self
            .forward(&input, 0, &mut state)
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let mut generated: Vec<Vec<u32>> = vec![Vec::new(); rows];
        let mut finished = vec![false; rows];

        for step in 0..params.max_new_tokens {
            let mut next_tokens = Vec::with_capacity(rows);
            for row in 0..rows {
                if finished[row] {
                    next_tokens.push(pad_id);
                    continue;
                }
                let mut row_logits = logits
                    .get(row)
                    .map_err(|e| PipelineError::Generation(e.to_string()))?;
                if params.repeat_penalty != 1.0 && !generated[row].is_empty() {
                    row_logits =
                        apply_repeat_penalty(&row_logits, params.repeat_penalty, &generated[row])
                            .map_err(|e| PipelineError::Generation(e.to_string()))?;
                }
                let token = samplers[row]
                    .sample(&row_logits)
                    .map_err(|e| PipelineError::Generation(e.to_string()))?;
                next_tokens.push(token);
                if self.eos_tokens.contains(&token) {
                    finished[row] = true;
                } else {
                    generated[row].push(token);
                }
            }

            if finished.iter().all(|&f| f) || step + 1 == params.max_new_tokens {
                break;
            }

            let next = Tensor::from_vec(next_tokens, (rows, 1), &self.device)
                .map_err(|e| PipelineError::Generation(e.to_string()))?;
            logits = self
                .forward(&next, padded_len + step, &mut state)
                .map_err(|e| PipelineError::Generation(e.to_string()))?;
        }

        Ok(generated)
    }
}

impl CausalModel for CandleModel {
    fn eos_token_id(&self) -> Option<u32> {
        self.eos_tokens.first().copied()
    }

    fn accelerate(&mut self) -> Result<(), PipelineError> {
        if self.fast_attention {
            return Ok(());
        }
        if !cfg!(feature = "flash-attn") {
            return Err(PipelineError::Unsupported(
                "built without the flash-attn feature".to_string(),
            ));
        }
        if !self.device.is_cuda() {
            return Err(PipelineError::Unsupported(
                "flash attention requires a CUDA device".to_string(),
            ));
        }
        if !matches!(self.arch, Arch::Llama { .. }) {
            return Err(PipelineError::Unsupported(
                "flash attention is only wired up for llama models".to_string(),
            ));
        }
        self.arch = build_arch(
            &self.raw_config,
            &self.weight_files,
            self.dtype,
            &self.device,
            true,
        )?;
        self.fast_attention = true;
        log::debug!("Rebuilt model with flash attention");
        Ok(())
    }

    fn generate(
        &mut self,
        tokenizer: &dyn PromptTokenizer,
        prompts: &[String],
        params: &GenerationParams,
        do_sample: bool,
        batch_size: usize,
    ) -> Result<Vec<Vec<String>>, PipelineError> {
        let pad_id = tokenizer
            .pad_token_id()
            .or_else(|| self.eos_tokens.first().copied())
            .ok_or_else(|| {
                PipelineError::Generation(
                    "no pad token available and the model declares no EOS token".to_string(),
                )
            })?;

        if !params.extra.is_empty() {
            let keys: Vec<&str> = params.extra.keys().map(String::as_str).collect();
            log::debug!("Ignoring unrecognized generation option(s): {keys:?}");
        }

        let mut completions = Vec::with_capacity(prompts.len());
        for (chunk_idx, chunk) in prompts.chunks(batch_size.max(1)).enumerate() {
            let mut sequences = Vec::with_capacity(chunk.len());
            for prompt in chunk {
                let ids = tokenizer
                    .encode(prompt)
                    .map_err(|e| PipelineError::Generation(e.to_string()))?;
                sequences.push(ids);
            }

            // Rows of different token length cannot share a forward batch
            // (see generate_batch), so each equal-length group runs on its
            // own. The upstream length sort keeps groups large.
            let lens: Vec<usize> = sequences.iter().map(Vec::len).collect();
            let mut texts: Vec<Option<String>> = Vec::with_capacity(chunk.len());
            texts.resize_with(chunk.len(), || None);

            for rows in group_rows_by_len(&lens) {
                let group: Vec<Vec<u32>> =
                    rows.iter().map(|&r| sequences[r].clone()).collect();
                let batch = pad_left(&group, pad_id);
                let mut samplers: Vec<LogitsProcessor> = rows
                    .iter()
                    .map(|&r| {
                        build_sampler(params, do_sample, (chunk_idx * batch_size + r) as u64)
                    })
                    .collect();

                let generated = self.generate_batch(&batch, &mut samplers, params, pad_id)?;
                for (&r, tokens) in rows.iter().zip(&generated) {
                    let text = tokenizer
                        .decode(tokens)
                        .map_err(|e| PipelineError::Generation(e.to_string()))?;
                    texts[r] = Some(text);
                }
            }

            for text in texts {
                let text = text.ok_or_else(|| {
                    PipelineError::Generation("missing row in batch output".to_string())
                })?;
                completions.push(vec![text]);
            }
        }
        Ok(completions)
    }
}

/// Group row indices by sequence length, preserving row order within each
/// group and returning groups in ascending length order.
fn group_rows_by_len(seq_lens: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &len) in seq_lens.iter().enumerate() {
        groups.entry(len).or_default().push(row);
    }
    groups.into_values().collect()
}

/// One logits processor per batch row, so sampled rows stay independent.
fn build_sampler(params: &GenerationParams, do_sample: bool, row: u64) -> LogitsProcessor {
    let seed = params.seed.unwrap_or_else(rand::random).wrapping_add(row);
    let temperature = params.temperature.unwrap_or(1.0);
    let sampling = if !do_sample || temperature <= 0.0 {
        Sampling::ArgMax
    } else {
        match (params.top_k, params.top_p) {
            (None, None) => Sampling::All { temperature },
            (Some(k), None) => Sampling::TopK { k, temperature },
            (None, Some(p)) => Sampling::TopP { p, temperature },
            (Some(k), Some(p)) => Sampling::TopKThenTopP { k, p, temperature },
        }
    };
    LogitsProcessor::from_sampling(seed, sampling)
}

/// EOS token ids from a model `config.json`. Some configs declare a single
/// id, some a list, some none at all.
fn parse_eos_tokens(config: &serde_json::Value) -> Vec<u32> {
    match &config["eos_token_id"] {
        serde_json::Value::Number(n) => n.as_u64().map(|id| id as u32).into_iter().collect(),
        serde_json::Value::Array(ids) => ids
            .iter()
            .filter_map(|v| v.as_u64().map(|id| id as u32))
            .collect(),
        _ => Vec::new(),
    }
}

fn build_arch(
    raw_config: &serde_json::Value,
    weight_files: &[PathBuf],
    dtype: DType,
    device: &Device,
    use_flash_attn: bool,
) -> Result<Arch, PipelineError> {
    let model_type = raw_config["model_type"].as_str().unwrap_or("llama");
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(weight_files, dtype, device)
            .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?
    };

    match model_type {
        "llama" => {
            let config: LlamaConfig = serde_json::from_value(raw_config.clone())
                .map_err(|e| PipelineError::ResourceLoad(format!("invalid llama config: {e}")))?;
            let config = config.into_config(use_flash_attn);
            let model = Llama::load(vb, &config)
                .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
            Ok(Arch::Llama { model, config })
        }
        "mistral" => {
            if use_flash_attn {
                return Err(PipelineError::Unsupported(
                    "flash attention is only wired up for llama models".to_string(),
                ));
            }
            let config: mistral::Config = serde_json::from_value(raw_config.clone())
                .map_err(|e| PipelineError::ResourceLoad(format!("invalid mistral config: {e}")))?;
            let model = mistral::Model::new(&config, vb)
                .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
            Ok(Arch::Mistral { model })
        }
        other => Err(PipelineError::ResourceLoad(format!(
            "Unsupported architecture '{other}' (expected llama or mistral)"
        ))),
    }
}
