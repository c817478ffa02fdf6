// src/model/source.rs
use crate::config::{BackendKind, DEFAULT_MODEL_SOURCE, ModelConfig};
use crate::errors::{CheckerError, Result};
use std::path::{Path, PathBuf};

/// File whose presence marks a directory as a model bundle.
pub const MODEL_DESCRIPTOR: &str = "config.json";

/// Where the model artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(PathBuf),
    Remote(String),
}

impl ModelSource {
    pub fn is_local(&self) -> bool {
        matches!(self, ModelSource::Local(_))
    }

    /// Identifier reported by `/health` and `/info`.
    pub fn label(&self) -> String {
        match self {
            ModelSource::Local(path) => format!("local:{}", path.display()),
            ModelSource::Remote(id) => id.clone(),
        }
    }
}

pub fn is_model_dir(path: &Path) -> bool {
    path.is_dir() && path.join(MODEL_DESCRIPTOR).is_file()
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    }
}

/// Resolves the model source: `MODEL_DIR`, then `MODEL_SOURCE`, then the default id.
///
/// An explicit `MODEL_DIR` that is not a model folder is an error, never a fallback.
pub fn resolve_source(config: &ModelConfig) -> Result<ModelSource> {
    if let Some(dir) = config.model_dir.as_deref() {
        if config.backend == BackendKind::Ollama {
            return Err(CheckerError::Config(
                "MODEL_DIR is not supported by the ollama backend; set MODEL_SOURCE to an Ollama model name".to_string(),
            ));
        }
        let expanded = expand_home(dir);
        let path = std::fs::canonicalize(&expanded).unwrap_or(expanded);
        if is_model_dir(&path) {
            return Ok(ModelSource::Local(path));
        }
        return Err(CheckerError::InvalidModelDir { path });
    }

    let id = config
        .model_source
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL_SOURCE.to_string());
    Ok(ModelSource::Remote(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn model_config() -> ModelConfig {
        AppConfig::from_lookup(|_| None).unwrap().model
    }

    #[test]
    fn valid_local_dir_wins_over_remote_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_DESCRIPTOR), "{}").unwrap();

        let mut config = model_config();
        config.model_dir = Some(dir.path().display().to_string());
        config.model_source = Some("owner/repo".to_string());

        let source = resolve_source(&config).unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(source, ModelSource::Local(expected.clone()));
        assert!(source.is_local());
        assert_eq!(source.label(), format!("local:{}", expected.display()));
    }

    #[test]
    fn local_dir_without_descriptor_is_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = model_config();
        config.model_dir = Some(dir.path().display().to_string());
        config.model_source = Some("owner/repo".to_string());

        let err = resolve_source(&config).unwrap_err();
        assert!(matches!(err, CheckerError::InvalidModelDir { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn missing_local_dir_is_fatal() {
        let mut config = model_config();
        config.model_dir = Some("/definitely/not/here".to_string());

        assert!(matches!(
            resolve_source(&config),
            Err(CheckerError::InvalidModelDir { .. })
        ));
    }

    #[test]
    fn remote_id_used_as_is() {
        let mut config = model_config();
        config.model_source = Some("owner/custom-checker".to_string());

        let source = resolve_source(&config).unwrap();
        assert_eq!(source, ModelSource::Remote("owner/custom-checker".to_string()));
        assert_eq!(source.label(), "owner/custom-checker");
    }

    #[test]
    fn falls_back_to_default_id() {
        let source = resolve_source(&model_config()).unwrap();
        assert_eq!(source, ModelSource::Remote(DEFAULT_MODEL_SOURCE.to_string()));
    }

    #[test]
    fn ollama_rejects_local_dir() {
        let mut config = model_config();
        config.backend = BackendKind::Ollama;
        config.model_dir = Some("/models/checker".to_string());

        assert!(matches!(resolve_source(&config), Err(CheckerError::Config(_))));
    }
}
