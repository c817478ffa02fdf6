// src/model/cache.rs
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::model::{ModelBundle, ModelLoader};

type LoadOutcome = std::result::Result<Arc<ModelBundle>, String>;

/// Process-wide single slot holding the loaded model or the reason it failed.
///
/// The first caller runs the loader; concurrent callers wait for that same attempt.
/// The outcome is final: a failed load is not retried until the process restarts.
pub struct ModelCache {
    loader: Box<dyn ModelLoader>,
    slot: OnceCell<LoadOutcome>,
}

impl ModelCache {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slot: OnceCell::new(),
        }
    }

    /// Returns the bundle, loading it on first use. `None` if loading failed.
    pub async fn get(&self) -> Option<Arc<ModelBundle>> {
        let outcome = self
            .slot
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(bundle) => {
                        log::info!(
                            "Model loaded from {} on {} ({})",
                            bundle.source,
                            bundle.device,
                            bundle.dtype
                        );
                        Ok(Arc::new(bundle))
                    }
                    Err(e) => {
                        let recorded = format!("{}: {}", e.kind(), e);
                        log::error!("Model load failed: {}", recorded);
                        Err(recorded)
                    }
                }
            })
            .await;
        outcome.as_ref().ok().cloned()
    }

    /// The bundle if a load already succeeded; never triggers a load.
    pub fn loaded(&self) -> Option<Arc<ModelBundle>> {
        self.slot.get().and_then(|outcome| outcome.as_ref().ok().cloned())
    }

    /// `"<kind>: <message>"` of the failed load, if any.
    pub fn load_error(&self) -> Option<String> {
        self.slot
            .get()
            .and_then(|outcome| outcome.as_ref().err().cloned())
    }
}
