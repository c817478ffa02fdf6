// src/config.rs
use crate::errors::{CheckerError, Result};
use std::path::PathBuf;

/// Model used when neither `MODEL_DIR` nor `MODEL_SOURCE` is set.
pub const DEFAULT_MODEL_SOURCE: &str = "NaruMaru/ege-checker-qwen2p5-0p5b-demo";
pub const DEFAULT_HF_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_OLLAMA_API_BASE: &str = "http://localhost:11434";

/// Which inference runtime serves the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process safetensors model run with candle.
    Candle,
    /// A model served by a local Ollama daemon.
    Ollama,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Candle => "candle",
            BackendKind::Ollama => "ollama",
        }
    }
}

/// How the request is rendered before it reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    Plain,
    ChatMl,
}

/// Where the model artifacts come from and how to fetch them.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_dir: Option<String>,
    pub model_source: Option<String>,
    pub revision: String,
    pub hf_token: Option<String>,
    pub hf_endpoint: String,
    pub cache_dir: PathBuf,
    pub backend: BackendKind,
    pub ollama_api_base: String,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub prompt_style: PromptStyle,
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| CheckerError::Config(format!("Invalid value for PORT: {}", e)))?,
            None => 8080,
        };

        let prompt_style = match get("PROMPT_STYLE").map(|s| s.to_lowercase()).as_deref() {
            None | Some("plain") => PromptStyle::Plain,
            Some("chatml") => PromptStyle::ChatMl,
            Some(other) => {
                return Err(CheckerError::Config(format!(
                    "Unknown PROMPT_STYLE '{}'. Expected 'plain' or 'chatml'.",
                    other
                )));
            }
        };

        let backend = match get("MODEL_BACKEND").map(|s| s.to_lowercase()).as_deref() {
            None | Some("candle") => BackendKind::Candle,
            Some("ollama") => BackendKind::Ollama,
            Some(other) => {
                return Err(CheckerError::Config(format!(
                    "Unknown MODEL_BACKEND '{}'. Expected 'candle' or 'ollama'.",
                    other
                )));
            }
        };

        let cache_dir = get("MODEL_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::cache_dir().map(|d| d.join("ege-checker")))
            .unwrap_or_else(|| PathBuf::from(".ege-checker-cache"));

        let model = ModelConfig {
            model_dir: get("MODEL_DIR"),
            model_source: get("MODEL_SOURCE"),
            revision: get("MODEL_REVISION").unwrap_or_else(|| "main".to_string()),
            hf_token: get("HF_TOKEN").or_else(|| get("HUGGING_FACE_HUB_TOKEN")),
            hf_endpoint: get("HF_ENDPOINT").unwrap_or_else(|| DEFAULT_HF_ENDPOINT.to_string()),
            cache_dir,
            backend,
            ollama_api_base: get("OLLAMA_API_BASE")
                .unwrap_or_else(|| DEFAULT_OLLAMA_API_BASE.to_string()),
        };

        Ok(AppConfig {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            prompt_style,
            model,
        })
    }
}
