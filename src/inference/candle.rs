// src/inference/candle.rs

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::{llama, qwen2};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokenizers::Tokenizer;
use tokenizers::models::ModelWrapper;

use crate::errors::{CheckerError, Result};
use crate::inference::{InferenceBackend, strip_prompt_echo};
use crate::model::artifacts::ModelFiles;
use crate::model::device::ComputeTarget;

/// Special tokens that end a turn in the model families we load.
const KNOWN_STOP_TOKENS: [&str; 3] = ["<|im_end|>", "<|endoftext|>", "</s>"];

enum Architecture {
    Qwen2(qwen2::ModelForCausalLM),
    Llama(llama::Llama, llama::Config),
}

struct LoadedModel {
    arch: Architecture,
    device: Device,
    dtype: DType,
}

impl LoadedModel {
    /// Runs [`greedy_decode`] over this model's forward pass.
    fn greedy_generate(
        &mut self,
        prompt_ids: &[u32],
        max_new_tokens: usize,
        eos_token_ids: &[u32],
    ) -> Result<Vec<u32>> {
        let device = &self.device;
        let arch = &mut self.arch;

        let mut llama_cache = match arch {
            Architecture::Qwen2(model) => {
                model.clear_kv_cache();
                None
            }
            Architecture::Llama(_, config) => {
                Some(llama::Cache::new(true, self.dtype, config, device)?)
            }
        };

        greedy_decode(prompt_ids, max_new_tokens, eos_token_ids, |context, offset| {
            let input = Tensor::new(context, device)?.unsqueeze(0)?;
            let logits = match arch {
                Architecture::Qwen2(model) => model.forward(&input, offset)?,
                Architecture::Llama(model, _) => {
                    let cache = llama_cache.as_mut().ok_or_else(|| {
                        CheckerError::Inference("llama cache missing".to_string())
                    })?;
                    model.forward(&input, offset, cache)?
                }
            };
            Ok(logits.flatten_all()?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
        })
    }
}

/// Greedy decoding: always the arg-max token, stopping at EOS or after `max_new_tokens`.
///
/// `logits` is called with the tokens to feed and their position offset: the whole
/// prompt at offset 0 first, then each newly chosen token on its own. It returns the
/// next-token scores over the vocabulary.
fn greedy_decode<F>(
    prompt_ids: &[u32],
    max_new_tokens: usize,
    eos_token_ids: &[u32],
    mut logits: F,
) -> Result<Vec<u32>>
where
    F: FnMut(&[u32], usize) -> Result<Vec<f32>>,
{
    if prompt_ids.is_empty() {
        return Err(CheckerError::Inference("prompt encodes to no tokens".to_string()));
    }

    let mut generated: Vec<u32> = Vec::new();
    let mut offset = 0;

    for step in 0..max_new_tokens {
        let context = if step == 0 {
            prompt_ids
        } else {
            &generated[generated.len() - 1..]
        };
        let scores = logits(context, offset)?;
        offset += context.len();

        let next = arg_max(&scores)
            .ok_or_else(|| CheckerError::Inference("model returned no logits".to_string()))?;
        if eos_token_ids.contains(&next) {
            break;
        }
        generated.push(next);
    }

    Ok(generated)
}

/// Index of the highest score; the first one wins ties.
fn arg_max(scores: &[f32]) -> Option<u32> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i as u32)
}

struct Inner {
    model: Mutex<LoadedModel>,
    tokenizer: Tokenizer,
    eos_token_ids: Vec<u32>,
}

impl Inner {
    fn generate_blocking(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| CheckerError::Tokenizer(e.to_string()))?;
        let prompt_ids = encoding.get_ids().to_vec();

        let generated = {
            let mut model = self
                .model
                .lock()
                .map_err(|_| CheckerError::Inference("model lock poisoned".to_string()))?;
            model.greedy_generate(&prompt_ids, max_new_tokens, &self.eos_token_ids)?
        };

        let mut all_ids = prompt_ids.clone();
        all_ids.extend_from_slice(&generated);
        let decoded = self
            .tokenizer
            .decode(&all_ids, true)
            .map_err(|e| CheckerError::Tokenizer(e.to_string()))?;
        let decoded_prompt = self
            .tokenizer
            .decode(&prompt_ids, true)
            .map_err(|e| CheckerError::Tokenizer(e.to_string()))?;

        log::info!(
            "Generated {} tokens from a {}-token prompt in {}ms",
            generated.len(),
            prompt_ids.len(),
            start.elapsed().as_millis()
        );

        Ok(strip_prompt_echo(&decoded, prompt, &decoded_prompt))
    }
}

/// In-process causal LM loaded from safetensors.
pub struct CandleBackend {
    inner: Arc<Inner>,
    tokenizer_type: &'static str,
}

impl CandleBackend {
    /// Loads tokenizer and weights. Blocking; call from a blocking thread.
    pub fn load(files: &ModelFiles, target: &ComputeTarget) -> Result<Self> {
        let config: Value = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let model_type = config
            .get("model_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| CheckerError::Tokenizer(e.to_string()))?;

        let generation_config = match &files.generation_config {
            Some(path) => Some(serde_json::from_str::<Value>(&std::fs::read_to_string(path)?)?),
            None => None,
        };
        let eos_token_ids = collect_eos_ids(&tokenizer, generation_config.as_ref(), &config);

        log::info!(
            "Loading {} model from {} weight file(s) on {} ({})",
            model_type,
            files.weights.len(),
            target.device_name(),
            target.dtype_name()
        );

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(files.weights.as_slice(), target.dtype, &target.device)?
        };

        let arch = match model_type.as_str() {
            "qwen2" => {
                let cfg: qwen2::Config = serde_json::from_value(config)?;
                Architecture::Qwen2(qwen2::ModelForCausalLM::new(&cfg, vb)?)
            }
            "llama" => {
                let cfg: llama::LlamaConfig = serde_json::from_value(config)?;
                let cfg = cfg.into_config(false);
                Architecture::Llama(llama::Llama::load(vb, &cfg)?, cfg)
            }
            other => return Err(CheckerError::UnsupportedArchitecture(other.to_string())),
        };

        let tokenizer_type = tokenizer_type(&tokenizer);

        Ok(Self {
            inner: Arc::new(Inner {
                model: Mutex::new(LoadedModel {
                    arch,
                    device: target.device.clone(),
                    dtype: target.dtype,
                }),
                tokenizer,
                eos_token_ids,
            }),
            tokenizer_type,
        })
    }

    pub fn tokenizer_type(&self) -> &'static str {
        self.tokenizer_type
    }
}

#[async_trait]
impl InferenceBackend for CandleBackend {
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || inner.generate_blocking(&prompt, max_new_tokens))
            .await
            .map_err(|e| CheckerError::Inference(format!("generation task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "candle"
    }
}

#[allow(unreachable_patterns)]
fn tokenizer_type(tokenizer: &Tokenizer) -> &'static str {
    match tokenizer.get_model() {
        ModelWrapper::BPE(_) => "BPE",
        ModelWrapper::WordPiece(_) => "WordPiece",
        ModelWrapper::WordLevel(_) => "WordLevel",
        ModelWrapper::Unigram(_) => "Unigram",
        _ => "Unknown",
    }
}

/// `eos_token_id` may be a single id or a list.
fn eos_ids_from(config: &Value) -> Vec<u32> {
    match config.get("eos_token_id") {
        Some(Value::Number(n)) => n.as_u64().map(|id| vec![id as u32]).unwrap_or_default(),
        Some(Value::Array(ids)) => ids
            .iter()
            .filter_map(Value::as_u64)
            .map(|id| id as u32)
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_eos_ids(
    tokenizer: &Tokenizer,
    generation_config: Option<&Value>,
    config: &Value,
) -> Vec<u32> {
    let mut ids = generation_config.map(eos_ids_from).unwrap_or_default();
    ids.extend(eos_ids_from(config));
    ids.extend(
        KNOWN_STOP_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token)),
    );
    ids.sort_unstable();
    ids.dedup();
    ids
}
