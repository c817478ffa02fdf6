// src/checker.rs
use crate::config::PromptStyle;
use crate::errors::Result;
use crate::model::ModelBundle;
use crate::models::CheckRequest;
use crate::parser::parse_output;
use crate::prompt;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Verdict for one checked solution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// 1 for `верно`, 0 for `неверно`.
    pub verdict: u8,
    pub verdict_text: String,
    pub explanation: String,
    /// Model output with the prompt echo removed.
    pub raw: String,
}

/// Runs one request through prompt building, generation and parsing.
pub async fn run_check(
    bundle: &ModelBundle,
    req: &CheckRequest,
    style: PromptStyle,
) -> Result<CheckResult> {
    let rendered = prompt::render(req, style);
    let start = Instant::now();

    let raw = bundle
        .backend
        .generate(&rendered, req.max_new_tokens)
        .await?;
    let latency_ms = start.elapsed().as_millis() as u64;

    let parsed = parse_output(&raw);
    log::info!(
        "Model {} answered in {}ms: {}",
        bundle.source,
        latency_ms,
        parsed.verdict
    );
    log::debug!("Raw model output:\n{}", raw);

    Ok(CheckResult {
        verdict: parsed.verdict.as_int(),
        verdict_text: parsed.verdict.as_text().to_string(),
        explanation: parsed.explanation,
        raw,
    })
}
