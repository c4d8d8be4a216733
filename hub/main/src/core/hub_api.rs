//! HuggingFace Hub client for synchronous artifact downloads.

use crate::api::error::{HubError, HubResult};
use crate::api::types::ModelArtifacts;
use std::path::PathBuf;

/// HuggingFace Hub API client
#[derive(Debug, Clone)]
pub struct HubApi {
    /// Cache directory for downloaded models
    cache_dir: PathBuf,
    /// API token (optional, for private models)
    token: Option<String>,
}

impl Default for HubApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HubApi {
    /// Create a new Hub API client
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("localgen")
            .join("hub");

        // Auto-detect HF_TOKEN from environment
        let token = std::env::var("HF_TOKEN").ok();

        Self { cache_dir, token }
    }

    /// Set the cache directory, keeping any configured token
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Set API token for private models
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the cache directory
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Get the configured API token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build the hf-hub sync API, passing through any token from self.token.
    /// The hf-hub crate (0.4.x) does NOT read HF_TOKEN from the environment;
    /// it only reads a token file in the cache dir.  We bridge that gap here.
    fn hf_sync_api(&self) -> HubResult<hf_hub::api::sync::Api> {
        hf_hub::api::sync::ApiBuilder::new()
            .with_cache_dir(self.cache_dir.join("hf"))
            .with_token(self.token.clone())
            .build()
            .map_err(|e| HubError::NetworkError(format!("Failed to create hf-hub API: {}", e)))
    }

    /// Download a model from HuggingFace Hub (synchronous, via hf-hub crate).
    ///
    /// `config.json` is required. `tokenizer.json` and the weight files
    /// (single `model.safetensors`, or every shard listed by
    /// `model.safetensors.index.json`) are fetched when the repository has
    /// them; which of those a caller needs is its own concern.
    pub fn download_model_sync(&self, model_id: &str) -> HubResult<ModelArtifacts> {
        let api = self.hf_sync_api()?;
        let repo = api.model(model_id.to_string());

        let config_path = repo.get("config.json").map_err(|e| {
            HubError::NetworkError(format!(
                "Failed to download config.json for {}: {}",
                model_id, e
            ))
        })?;
        let model_dir = config_path.parent().unwrap_or(&config_path).to_path_buf();

        let _ = repo.get("tokenizer.json").ok();

        if repo.get("model.safetensors").is_err() {
            // Sharded checkpoint: the index names every shard file.
            if let Ok(index_path) = repo.get("model.safetensors.index.json") {
                for shard in read_shard_names(&index_path)? {
                    repo.get(&shard).map_err(|e| {
                        HubError::NetworkError(format!(
                            "Failed to download shard {} for {}: {}",
                            shard, model_id, e
                        ))
                    })?;
                }
            }
        }

        // Register in the localgen cache so get_cached() can find it
        self.link_to_cache(model_id, &model_dir);
        log::info!("Downloaded {} to {}", model_id, model_dir.display());

        Ok(ModelArtifacts {
            model_id: model_id.to_string(),
            model_dir,
        })
    }

    /// Create a symlink in the localgen cache directory pointing to a model
    /// directory managed by the hf-hub crate. This bridges the two cache
    /// layouts so that `get_cached()` can discover models downloaded via the
    /// hf-hub path with a flat lookup.
    fn link_to_cache(&self, model_id: &str, model_dir: &std::path::Path) {
        let cache_entry = self.cache_dir.join(model_id.replace('/', "--"));
        if cache_entry.exists() {
            return;
        }
        let _ = std::fs::create_dir_all(&self.cache_dir);
        #[cfg(unix)]
        {
            let _ = std::os::unix::fs::symlink(model_dir, &cache_entry);
        }
        #[cfg(windows)]
        {
            let _ = std::os::windows::fs::symlink_dir(model_dir, &cache_entry);
        }
    }

    /// Check if a model is cached locally
    pub fn is_cached(&self, model_id: &str) -> bool {
        let model_dir = self.cache_dir.join(model_id.replace('/', "--"));
        model_dir.exists() && model_dir.join("config.json").exists()
    }

    /// Get cached model artifacts without downloading
    pub fn get_cached(&self, model_id: &str) -> Option<ModelArtifacts> {
        if self.is_cached(model_id) {
            Some(ModelArtifacts {
                model_id: model_id.to_string(),
                model_dir: self.cache_dir.join(model_id.replace('/', "--")),
            })
        } else {
            None
        }
    }
}

/// Parse the shard file names out of a `model.safetensors.index.json`.
pub(crate) fn read_shard_names(index_path: &std::path::Path) -> HubResult<Vec<String>> {
    let content = std::fs::read_to_string(index_path)?;
    let index: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| HubError::ParseError(e.to_string()))?;
    let weight_map = index["weight_map"].as_object().ok_or_else(|| {
        HubError::ParseError(format!("no weight_map object in {}", index_path.display()))
    })?;

    let mut shards: Vec<String> = weight_map
        .values()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    shards.sort();
    shards.dedup();
    Ok(shards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "localgen-hub-api-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn hub_api_creation() {
        let api = HubApi::new();
        assert!(!api.cache_dir().as_os_str().is_empty());
    }

    #[test]
    fn custom_cache_dir_is_used() {
        let dir = tempdir();
        let api = HubApi::new().with_cache_dir(&dir);
        assert_eq!(api.cache_dir(), &dir);
    }

    #[test]
    fn cache_dir_override_keeps_token() {
        let api = HubApi::new().with_token("secret").with_cache_dir(tempdir());
        assert_eq!(api.token(), Some("secret"));
    }

    #[test]
    fn uncached_model_is_not_reported_cached() {
        let api = HubApi::new().with_cache_dir(tempdir());
        assert!(!api.is_cached("nonexistent/model"));
        assert!(api.get_cached("nonexistent/model").is_none());
    }

    #[test]
    fn cached_model_requires_config_json() {
        let dir = tempdir();
        let model_dir = dir.join("test--no-config");
        std::fs::create_dir_all(&model_dir).unwrap();
        let api = HubApi::new().with_cache_dir(&dir);
        assert!(!api.is_cached("test/no-config"));
    }

    #[test]
    fn get_cached_finds_model_with_config() {
        let dir = tempdir();
        let model_dir = dir.join("openai-community--gpt2");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("config.json"), "{}").unwrap();
        let api = HubApi::new().with_cache_dir(&dir);
        let artifacts = api.get_cached("openai-community/gpt2").unwrap();
        assert_eq!(artifacts.model_id, "openai-community/gpt2");
        assert_eq!(artifacts.model_dir, model_dir);
    }

    #[cfg(unix)]
    #[test]
    fn link_to_cache_bridges_external_dir() {
        let cache = tempdir();
        let external = tempdir();
        std::fs::write(external.join("config.json"), "{}").unwrap();

        let api = HubApi::new().with_cache_dir(&cache);
        api.link_to_cache("org/model", &external);

        assert!(api.is_cached("org/model"));
        let artifacts = api.get_cached("org/model").unwrap();
        assert!(artifacts.config_path().exists());
    }

    #[test]
    fn shard_names_are_sorted_and_deduped() {
        let dir = tempdir();
        let index_path = dir.join("model.safetensors.index.json");
        std::fs::write(
            &index_path,
            r#"{"weight_map":{"a":"model-00002-of-00002.safetensors","b":"model-00001-of-00002.safetensors","c":"model-00001-of-00002.safetensors"}}"#,
        )
        .unwrap();
        let shards = read_shard_names(&index_path).unwrap();
        assert_eq!(
            shards,
            vec![
                "model-00001-of-00002.safetensors".to_string(),
                "model-00002-of-00002.safetensors".to_string(),
            ]
        );
    }
}
