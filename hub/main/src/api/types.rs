//! Data types for hub API operations

use crate::api::error::{HubError, HubResult};
use std::path::PathBuf;

/// Locally resolved files for one model: a directory holding `config.json`,
/// weights in SafeTensors format (single file or sharded) and, when the
/// repository ships one, `tokenizer.json`.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Model identifier (HuggingFace repo ID)
    pub model_id: String,
    /// Path to the directory containing the artifact files
    pub model_dir: PathBuf,
}

impl ModelArtifacts {
    /// Get path to config.json
    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join("config.json")
    }

    /// Get path to the single-file SafeTensors weights
    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join("model.safetensors")
    }

    /// Get path to the shard index for multi-file SafeTensors weights
    pub fn weights_index_path(&self) -> PathBuf {
        self.model_dir.join("model.safetensors.index.json")
    }

    /// Get path to tokenizer.json (HuggingFace universal tokenizer)
    pub fn tokenizer_json_path(&self) -> PathBuf {
        self.model_dir.join("tokenizer.json")
    }

    /// Load model configuration from config.json
    pub fn load_config_sync(&self) -> HubResult<serde_json::Value> {
        let content = std::fs::read_to_string(self.config_path())?;
        serde_json::from_str(&content).map_err(|e| HubError::ParseError(e.to_string()))
    }

    /// Resolve the weight file list: either the single `model.safetensors`
    /// or every shard named by `model.safetensors.index.json`.
    pub fn weight_files(&self) -> HubResult<Vec<PathBuf>> {
        let single = self.weights_path();
        if single.is_file() {
            return Ok(vec![single]);
        }

        let index_path = self.weights_index_path();
        if !index_path.is_file() {
            return Err(HubError::MissingArtifact {
                model_id: self.model_id.clone(),
                file: "model.safetensors".to_string(),
            });
        }

        let shards = crate::core::hub_api::read_shard_names(&index_path)?;
        if shards.is_empty() {
            return Err(HubError::ParseError(format!(
                "empty weight_map in {}",
                index_path.display()
            )));
        }

        Ok(shards
            .into_iter()
            .map(|name| self.model_dir.join(name))
            .collect())
    }

    /// Total on-disk size of the weight files, in bytes.
    pub fn weights_size(&self) -> HubResult<u64> {
        let mut total = 0u64;
        for file in self.weight_files()? {
            total += std::fs::metadata(&file)?.len();
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "localgen-hub-types-{}-{}",
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
    fn artifact_paths() {
        let artifacts = ModelArtifacts {
            model_id: "test/model".to_string(),
            model_dir: PathBuf::from("/tmp/test"),
        };
        assert!(artifacts.config_path().ends_with("config.json"));
        assert!(artifacts.weights_path().ends_with("model.safetensors"));
        assert!(artifacts.tokenizer_json_path().ends_with("tokenizer.json"));
    }

    #[test]
    fn weight_files_prefers_single_file() {
        let dir = tempdir();
        std::fs::write(dir.join("model.safetensors"), b"stub").unwrap();
        let artifacts = ModelArtifacts {
            model_id: "test/single".to_string(),
            model_dir: dir.clone(),
        };
        let files = artifacts.weight_files().unwrap();
        assert_eq!(files, vec![dir.join("model.safetensors")]);
    }

    #[test]
    fn weight_files_resolves_shards_from_index() {
        let dir = tempdir();
        let index = r#"{
            "metadata": {"total_size": 4},
            "weight_map": {
                "model.embed_tokens.weight": "model-00001-of-00002.safetensors",
                "lm_head.weight": "model-00002-of-00002.safetensors",
                "model.layers.0.mlp.gate_proj.weight": "model-00001-of-00002.safetensors"
            }
        }"#;
        std::fs::write(dir.join("model.safetensors.index.json"), index).unwrap();
        let artifacts = ModelArtifacts {
            model_id: "test/sharded".to_string(),
            model_dir: dir.clone(),
        };
        let files = artifacts.weight_files().unwrap();
        assert_eq!(
            files,
            vec![
                dir.join("model-00001-of-00002.safetensors"),
                dir.join("model-00002-of-00002.safetensors"),
            ]
        );
    }

    #[test]
    fn weight_files_missing_everything_errors() {
        let dir = tempdir();
        let artifacts = ModelArtifacts {
            model_id: "test/empty".to_string(),
            model_dir: dir,
        };
        let err = artifacts.weight_files().unwrap_err();
        assert!(matches!(err, HubError::MissingArtifact { .. }));
    }

    #[test]
    fn weights_size_sums_files() {
        let dir = tempdir();
        std::fs::write(dir.join("model.safetensors"), vec![0u8; 128]).unwrap();
        let artifacts = ModelArtifacts {
            model_id: "test/sized".to_string(),
            model_dir: dir,
        };
        assert_eq!(artifacts.weights_size().unwrap(), 128);
    }
}
