// src/model/artifacts.rs
use crate::errors::{CheckerError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const GENERATION_CONFIG_FILE: &str = "generation_config.json";
pub const SINGLE_WEIGHTS_FILE: &str = "model.safetensors";
pub const WEIGHTS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Paths of everything needed to build a model and its tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub generation_config: Option<PathBuf>,
    pub weights: Vec<PathBuf>,
}

#[derive(Deserialize)]
struct WeightIndex {
    weight_map: std::collections::HashMap<String, String>,
}

/// Distinct shard file names listed by a sharded checkpoint index, sorted.
pub fn shard_names(index_json: &str) -> Result<Vec<String>> {
    let index: WeightIndex = serde_json::from_str(index_json)?;
    let shards: BTreeSet<String> = index.weight_map.into_values().collect();
    Ok(shards.into_iter().collect())
}

fn required(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CheckerError::FileRead(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found in {}", name, dir.display()),
        )))
    }
}

impl ModelFiles {
    /// Locates the artifacts of a model folder laid out like a hub repository.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let config = required(dir, CONFIG_FILE)?;
        let tokenizer = required(dir, TOKENIZER_FILE)?;
        let generation_config = Some(dir.join(GENERATION_CONFIG_FILE)).filter(|p| p.is_file());

        let index = dir.join(WEIGHTS_INDEX_FILE);
        let weights = if index.is_file() {
            shard_names(&std::fs::read_to_string(&index)?)?
                .iter()
                .map(|name| required(dir, name))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![required(dir, SINGLE_WEIGHTS_FILE)?]
        };

        Ok(Self {
            config,
            tokenizer,
            generation_config,
            weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn shard_names_are_deduplicated_and_sorted() {
        let index = r#"{
            "metadata": {"total_size": 10},
            "weight_map": {
                "lm_head.weight": "model-00002-of-00002.safetensors",
                "model.embed_tokens.weight": "model-00001-of-00002.safetensors",
                "model.norm.weight": "model-00002-of-00002.safetensors"
            }
        }"#;

        assert_eq!(
            shard_names(index).unwrap(),
            vec![
                "model-00001-of-00002.safetensors".to_string(),
                "model-00002-of-00002.safetensors".to_string()
            ]
        );
    }

    #[test]
    fn single_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(dir.path(), SINGLE_WEIGHTS_FILE, "");

        let files = ModelFiles::from_dir(dir.path()).unwrap();
        assert_eq!(files.weights, vec![dir.path().join(SINGLE_WEIGHTS_FILE)]);
        assert_eq!(files.generation_config, None);
    }

    #[test]
    fn sharded_layout_requires_every_shard() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(dir.path(), GENERATION_CONFIG_FILE, "{}");
        touch(
            dir.path(),
            WEIGHTS_INDEX_FILE,
            r#"{"weight_map": {"a": "part-1.safetensors", "b": "part-2.safetensors"}}"#,
        );
        touch(dir.path(), "part-1.safetensors", "");

        assert!(ModelFiles::from_dir(dir.path()).is_err());

        touch(dir.path(), "part-2.safetensors", "");
        let files = ModelFiles::from_dir(dir.path()).unwrap();
        assert_eq!(files.weights.len(), 2);
        assert!(files.generation_config.is_some());
    }

    #[test]
    fn missing_tokenizer_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");

        let err = ModelFiles::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(TOKENIZER_FILE));
    }
}
