// src/api/state.rs
use crate::config::AppConfig;
use crate::model::{ArtifactLoader, ModelCache};
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub models: Arc<ModelCache>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let loader = ArtifactLoader::new(config.model.clone(), Client::new());
        Self::with_cache(config, ModelCache::new(loader))
    }

    pub fn with_cache(config: AppConfig, models: ModelCache) -> Self {
        Self {
            config: Arc::new(config),
            models: Arc::new(models),
        }
    }
}
