// src/models.rs
use crate::errors::{CheckerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_NEW_TOKENS: usize = 220;
pub const MAX_NEW_TOKENS_LIMIT: usize = 1024;

/// Body of `POST /predict`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckRequest {
    pub condition: String,
    pub student_solution: String,
    #[serde(default)]
    pub reference_solution: Option<String>,
    #[serde(default = "default_use_reference")]
    pub use_reference: bool,
    #[serde(default)]
    pub answer_hint: Option<String>,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,
}

fn default_use_reference() -> bool {
    true
}

fn default_max_new_tokens() -> usize {
    DEFAULT_MAX_NEW_TOKENS
}

impl CheckRequest {
    pub fn new(condition: impl Into<String>, student_solution: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            student_solution: student_solution.into(),
            reference_solution: None,
            use_reference: true,
            answer_hint: None,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }

    /// Rejects requests that must never reach the model.
    pub fn validate(&self) -> Result<()> {
        if self.condition.trim().is_empty() {
            return Err(CheckerError::Validation(
                "condition must not be empty".to_string(),
            ));
        }
        if self.student_solution.trim().is_empty() {
            return Err(CheckerError::Validation(
                "student_solution must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_NEW_TOKENS_LIMIT).contains(&self.max_new_tokens) {
            return Err(CheckerError::Validation(format!(
                "max_new_tokens must be between 1 and {}, got {}",
                MAX_NEW_TOKENS_LIMIT, self.max_new_tokens
            )));
        }
        Ok(())
    }
}
