// src/model/mod.rs
use crate::errors::Result;
use crate::inference::InferenceBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod artifacts;
pub mod cache;
pub mod device;
pub mod hub;
pub mod loader;
pub mod source;

pub use cache::ModelCache;
pub use loader::ArtifactLoader;

/// A loaded model together with everything `/info` reports about it.
#[derive(Clone)]
pub struct ModelBundle {
    pub backend: Arc<dyn InferenceBackend>,
    /// `local:<path>` or the remote identifier.
    pub source: String,
    pub device: String,
    pub dtype: String,
    pub tokenizer_type: String,
    pub loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("backend", &self.backend.name())
            .field("source", &self.source)
            .field("device", &self.device)
            .field("dtype", &self.dtype)
            .field("tokenizer_type", &self.tokenizer_type)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

/// Produces a model bundle. Called at most once per process by [`ModelCache`].
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<ModelBundle>;
}
