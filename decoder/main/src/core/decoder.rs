//! Batch completion decoding over a model provider.

use std::time::Instant;

use crate::api::error::{DecodeError, DecodeResult};
use crate::api::types::{DecodeOptions, LoadOptions};
use crate::core::candle::CandleProvider;
use crate::core::{device, order};
use crate::spi::contract::{ModelProvider, PipelineError};

/// Generate one completion per prompt with a locally loaded model.
///
/// Prompts are batched by `options.batch_size`; with batches larger than one,
/// prompts are sorted by length before generation and completions are
/// restored to the caller's prompt order afterwards. Completions contain only
/// the newly generated text.
pub fn complete_local(
    prompts: &[String],
    model_name: &str,
    options: &DecodeOptions,
) -> DecodeResult<Vec<String>> {
    complete(prompts, model_name, options, &CandleProvider::new())
}

/// Generate one completion per prompt using the given model provider.
pub fn complete<P: ModelProvider>(
    prompts: &[String],
    model_name: &str,
    options: &DecodeOptions,
    provider: &P,
) -> DecodeResult<Vec<String>> {
    validate(options)?;

    if prompts.is_empty() {
        log::info!("No prompts to decode.");
        return Ok(Vec::new());
    }

    log::info!(
        "Decoding {} prompt(s) with model '{}' (batch_size={})",
        prompts.len(),
        model_name,
        options.batch_size
    );

    let accelerator = device::accelerator_available();
    let load = LoadOptions::resolve(options, accelerator);
    log::debug!(
        "Resolved load options: precision={:?}, reduced_precision_matmul={}, accelerator={}",
        load.precision,
        load.reduced_precision_matmul,
        accelerator
    );

    let mut tokenizer = provider
        .load_tokenizer(model_name, &load)
        .map_err(|e| DecodeError::ResourceLoadError(e.to_string()))?;
    let mut model = provider
        .load_model(model_name, &load)
        .map_err(|e| DecodeError::ResourceLoadError(e.to_string()))?;

    // Faster attention only pays off for unbatched generation; padded
    // batches are not supported by the accelerated path.
    if options.batch_size == 1 {
        match model.accelerate() {
            Ok(()) => log::debug!("Model accelerated for unbatched generation"),
            Err(PipelineError::Unsupported(reason)) => {
                log::debug!("Acceleration unavailable, continuing without it: {reason}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let (prompts, sort_order) = if options.batch_size > 1 {
        let (sorted, order) = order::sort_by_len(prompts);
        (sorted, Some(order))
    } else {
        (prompts.to_vec(), None)
    };

    if let Some(eos) = model.eos_token_id() {
        log::debug!("Using EOS token {eos} as the pad token");
        tokenizer.set_pad_token_id(eos);
    }

    log::debug!(
        "Generation params: {:?}, do_sample={}",
        options.generation,
        options.do_sample
    );

    let start = Instant::now();
    let candidates = model.generate(
        tokenizer.as_ref(),
        &prompts,
        &options.generation,
        options.do_sample,
        options.batch_size,
    )?;
    log::info!(
        "Generated {} completion(s) in {:.2}s",
        candidates.len(),
        start.elapsed().as_secs_f64()
    );

    if candidates.len() != prompts.len() {
        return Err(DecodeError::GenerationError(format!(
            "Expected {} completion(s), got {}",
            prompts.len(),
            candidates.len()
        )));
    }

    let mut completions = Vec::with_capacity(candidates.len());
    for (i, ranked) in candidates.into_iter().enumerate() {
        let best = ranked.into_iter().next().ok_or_else(|| {
            DecodeError::GenerationError(format!("No completion candidates for prompt {i}"))
        })?;
        completions.push(best);
    }

    Ok(match sort_order {
        Some(order) => order::restore_order(completions, &order),
        None => completions,
    })
}

fn validate(options: &DecodeOptions) -> DecodeResult<()> {
    if options.batch_size < 1 {
        return Err(DecodeError::ConfigurationError(
            "batch_size must be at least 1".to_string(),
        ));
    }
    let gen = &options.generation;
    if gen.max_new_tokens < 1 {
        return Err(DecodeError::ConfigurationError(
            "max_new_tokens must be at least 1".to_string(),
        ));
    }
    if let Some(t) = gen.temperature {
        if !t.is_finite() || t < 0.0 {
            return Err(DecodeError::ConfigurationError(format!(
                "temperature must be non-negative, got {t}"
            )));
        }
    }
    if let Some(k) = gen.top_k {
        if k == 0 {
            return Err(DecodeError::ConfigurationError(
                "top_k must be at least 1".to_string(),
            ));
        }
    }
    if let Some(p) = gen.top_p {
        if !p.is_finite() || p <= 0.0 || p > 1.0 {
            return Err(DecodeError::ConfigurationError(format!(
                "top_p must be in (0, 1], got {p}"
            )));
        }
    }
    if !gen.repeat_penalty.is_finite() || gen.repeat_penalty <= 0.0 {
        return Err(DecodeError::ConfigurationError(format!(
            "repeat_penalty must be positive, got {}",
            gen.repeat_penalty
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::GenerationParams;

    fn options_with(gen: GenerationParams) -> DecodeOptions {
        DecodeOptions::default().with_generation(gen)
    }

    #[test]
    fn rejects_zero_batch_size() {
        let options = DecodeOptions::default().with_batch_size(0);
        assert!(matches!(
            validate(&options),
            Err(DecodeError::ConfigurationError(_))
        ));
    }

    #[test]
    fn rejects_zero_max_new_tokens() {
        let gen = GenerationParams {
            max_new_tokens: 0,
            ..Default::default()
        };
        assert!(validate(&options_with(gen)).is_err());
    }

    #[test]
    fn rejects_out_of_range_top_p() {
        for p in [0.0, -0.5, 1.5, f64::NAN] {
            let gen = GenerationParams {
                top_p: Some(p),
                ..Default::default()
            };
            assert!(validate(&options_with(gen)).is_err(), "top_p={p}");
        }
    }

    #[test]
    fn rejects_negative_temperature() {
        let gen = GenerationParams {
            temperature: Some(-1.0),
            ..Default::default()
        };
        assert!(validate(&options_with(gen)).is_err());
    }

    #[test]
    fn rejects_non_positive_repeat_penalty() {
        let gen = GenerationParams {
            repeat_penalty: 0.0,
            ..Default::default()
        };
        assert!(validate(&options_with(gen)).is_err());
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&DecodeOptions::default()).is_ok());
    }
}
