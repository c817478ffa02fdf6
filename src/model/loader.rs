// src/model/loader.rs
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;

use crate::config::{BackendKind, ModelConfig};
use crate::errors::{CheckerError, Result};
use crate::inference::candle::CandleBackend;
use crate::inference::ollama::OllamaBackend;
use crate::model::artifacts::ModelFiles;
use crate::model::device::select_device;
use crate::model::hub::HubClient;
use crate::model::source::{ModelSource, resolve_source};
use crate::model::{ModelBundle, ModelLoader};

/// Loads the configured model from a local folder, the hub, or an Ollama server.
pub struct ArtifactLoader {
    config: ModelConfig,
    client: Client,
}

impl ArtifactLoader {
    pub fn new(config: ModelConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn load_candle(&self, source: ModelSource) -> Result<ModelBundle> {
        let target = select_device();
        log::info!(
            "Selected device {} with {}",
            target.device_name(),
            target.dtype_name()
        );

        let files = match &source {
            ModelSource::Local(dir) => ModelFiles::from_dir(dir)?,
            ModelSource::Remote(id) => {
                HubClient::new(self.client.clone(), &self.config)
                    .fetch_model(id, &self.config.revision)
                    .await?
            }
        };

        let load_target = target.clone();
        let backend = tokio::task::spawn_blocking(move || CandleBackend::load(&files, &load_target))
            .await
            .map_err(|e| CheckerError::Inference(format!("model load task failed: {}", e)))??;

        Ok(ModelBundle {
            tokenizer_type: backend.tokenizer_type().to_string(),
            backend: Arc::new(backend),
            source: source.label(),
            device: target.device_name().to_string(),
            dtype: target.dtype_name().to_string(),
            loaded_at: Utc::now(),
        })
    }

    async fn load_ollama(&self, source: ModelSource) -> Result<ModelBundle> {
        let model = match &source {
            ModelSource::Remote(id) => id.clone(),
            ModelSource::Local(path) => {
                return Err(CheckerError::Config(format!(
                    "the ollama backend cannot load a local folder ({})",
                    path.display()
                )));
            }
        };

        let backend = OllamaBackend::new(
            self.client.clone(),
            self.config.ollama_api_base.clone(),
            model,
        );
        backend.verify().await?;

        Ok(ModelBundle {
            backend: Arc::new(backend),
            source: source.label(),
            device: self.config.ollama_api_base.clone(),
            dtype: "server-defined".to_string(),
            tokenizer_type: "ollama".to_string(),
            loaded_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ModelLoader for ArtifactLoader {
    async fn load(&self) -> Result<ModelBundle> {
        let source = resolve_source(&self.config)?;
        log::info!(
            "Loading model from {} with the {} backend",
            source.label(),
            self.config.backend.as_str()
        );

        match self.config.backend {
            BackendKind::Candle => self.load_candle(source).await,
            BackendKind::Ollama => self.load_ollama(source).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn invalid_model_dir_fails_before_touching_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::from_lookup(|_| None).unwrap().model;
        config.model_dir = Some(dir.path().display().to_string());

        let err = ArtifactLoader::new(config, Client::new())
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidModelDir");
    }

    #[tokio::test]
    async fn local_dir_without_weights_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"model_type": "qwen2"}"#).unwrap();
        let mut config = AppConfig::from_lookup(|_| None).unwrap().model;
        config.model_dir = Some(dir.path().display().to_string());

        let err = ArtifactLoader::new(config, Client::new())
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "IoError");
        assert!(err.to_string().contains("tokenizer.json"));
    }
}
