// src/inference/mod.rs

use crate::errors::Result;
use async_trait::async_trait;

pub mod candle;
pub mod ollama;

/// The narrow boundary between the checking pipeline and whatever runs the model.
///
/// Implementations decode greedily so identical prompts give identical outputs
/// on the same weights and hardware.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generates a completion for `prompt`, producing at most `max_new_tokens` new tokens.
    ///
    /// The returned text does not contain the echoed prompt.
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String>;

    /// Short backend name reported by `/info`.
    fn name(&self) -> &'static str;
}

/// Removes the echoed prompt from decoded output.
///
/// Tokenizers that skip special tokens do not reproduce the prompt byte for byte,
/// so the prompt's own decoded form is tried as well. Falls back to the whole
/// text, trimmed.
pub fn strip_prompt_echo(decoded: &str, prompt: &str, decoded_prompt: &str) -> String {
    if let Some(rest) = decoded.strip_prefix(prompt) {
        return rest.trim().to_string();
    }
    if !decoded_prompt.is_empty() {
        if let Some(rest) = decoded.strip_prefix(decoded_prompt) {
            return rest.trim().to_string();
        }
    }
    decoded.trim().to_string()
}
