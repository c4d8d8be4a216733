//! Resolves model names to local artifacts and loads candle models.

use crate::api::types::LoadOptions;
use crate::core::candle::model::CandleModel;
use crate::spi::contract::{CausalModel, ModelProvider, PipelineError};
use localgen_hub::{HubApi, ModelArtifacts};
use localgen_tokenizer::{HfTokenizer, PromptTokenizer};

/// Model provider backed by candle, resolving artifacts through the hub.
pub struct CandleProvider {
    hub: HubApi,
}

impl CandleProvider {
    pub fn new() -> Self {
        Self { hub: HubApi::new() }
    }

    pub fn with_hub(hub: HubApi) -> Self {
        Self { hub }
    }

    fn resolve(
        &self,
        model_name: &str,
        options: &LoadOptions,
    ) -> Result<ModelArtifacts, PipelineError> {
        let hub = match &options.cache_dir {
            Some(dir) => self.hub.clone().with_cache_dir(dir.clone()),
            None => self.hub.clone(),
        };
        if let Some(artifacts) = hub.get_cached(model_name) {
            log::debug!("Using cached artifacts for '{model_name}'");
            return Ok(artifacts);
        }
        hub.download_model_sync(model_name)
            .map_err(|e| PipelineError::ResourceLoad(e.to_string()))
    }
}

impl Default for CandleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelProvider for CandleProvider {
    fn load_tokenizer(
        &self,
        model_name: &str,
        options: &LoadOptions,
    ) -> Result<Box<dyn PromptTokenizer>, PipelineError> {
        let artifacts = self.resolve(model_name, options)?;
        let tokenizer_path = artifacts.tokenizer_json_path();
        if !tokenizer_path.exists() {
            return Err(PipelineError::ResourceLoad(format!(
                "Model '{model_name}' has no tokenizer.json"
            )));
        }
        let tokenizer = HfTokenizer::from_file(&tokenizer_path, options.padding_side)
            .map_err(|e| PipelineError::ResourceLoad(e.to_string()))?;
        Ok(Box::new(tokenizer))
    }

    fn load_model(
        &self,
        model_name: &str,
        options: &LoadOptions,
    ) -> Result<Box<dyn CausalModel>, PipelineError> {
        let artifacts = self.resolve(model_name, options)?;
        let model = CandleModel::load(&artifacts, options)?;
        Ok(Box::new(model))
    }
}
