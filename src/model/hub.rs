// src/model/hub.rs

use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::AsyncWriteExt;

use crate::config::ModelConfig;
use crate::errors::{CheckerError, Result};
use crate::model::artifacts::{
    CONFIG_FILE, GENERATION_CONFIG_FILE, ModelFiles, SINGLE_WEIGHTS_FILE, TOKENIZER_FILE,
    WEIGHTS_INDEX_FILE, shard_names,
};

/// Downloads model repositories from a Hugging Face compatible hub into a local cache.
pub struct HubClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    cache_dir: PathBuf,
}

impl HubClient {
    pub fn new(client: Client, config: &ModelConfig) -> Self {
        Self {
            client,
            endpoint: config.hf_endpoint.clone(),
            token: config.hf_token.clone(),
            cache_dir: config.cache_dir.clone(),
        }
    }

    /// Cache folder for one revision of a repository, `owner--repo/revision`.
    pub fn repo_dir(&self, repo_id: &str, revision: &str) -> PathBuf {
        self.cache_dir
            .join("models")
            .join(repo_id.replace('/', "--"))
            .join(revision)
    }

    pub fn file_url(&self, repo_id: &str, revision: &str, file: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.endpoint.trim_end_matches('/'),
            repo_id,
            revision,
            file
        )
    }

    /// Fetches a file unless it is already cached. `Ok(None)` means the hub has no such file.
    async fn fetch_file(
        &self,
        repo_id: &str,
        revision: &str,
        file: &str,
    ) -> Result<Option<PathBuf>> {
        let target = self.repo_dir(repo_id, revision).join(file);
        if target.is_file() {
            log::debug!("Using cached {}", target.display());
            return Ok(Some(target));
        }

        let url = self.file_url(repo_id, revision, file);
        log::info!("Downloading {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let mut resp = request.send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(CheckerError::ApiError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = target.with_file_name(format!("{}.part", file));
        let mut out = tokio::fs::File::create(&partial).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;
        drop(out);
        tokio::fs::rename(&partial, &target).await?;

        log::info!(
            "Saved {} ({} bytes, {}ms)",
            target.display(),
            written,
            start.elapsed().as_millis()
        );
        Ok(Some(target))
    }

    async fn fetch_required(&self, repo_id: &str, revision: &str, file: &str) -> Result<PathBuf> {
        self.fetch_file(repo_id, revision, file)
            .await?
            .ok_or_else(|| CheckerError::ApiError {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: format!("{} not found in {}@{}", file, repo_id, revision),
            })
    }

    /// Fetches config, tokenizer and weights (single file or every listed shard).
    pub async fn fetch_model(&self, repo_id: &str, revision: &str) -> Result<ModelFiles> {
        let config = self.fetch_required(repo_id, revision, CONFIG_FILE).await?;
        let tokenizer = self.fetch_required(repo_id, revision, TOKENIZER_FILE).await?;
        let generation_config = self
            .fetch_file(repo_id, revision, GENERATION_CONFIG_FILE)
            .await?;

        let cached_single = self.repo_dir(repo_id, revision).join(SINGLE_WEIGHTS_FILE);
        if cached_single.is_file() {
            log::debug!("Using cached {}", cached_single.display());
            return Ok(ModelFiles {
                config,
                tokenizer,
                generation_config,
                weights: vec![cached_single],
            });
        }

        let weights = match self.fetch_file(repo_id, revision, WEIGHTS_INDEX_FILE).await? {
            Some(index) => {
                let mut shards = Vec::new();
                for name in shard_names(&tokio::fs::read_to_string(&index).await?)? {
                    shards.push(self.fetch_required(repo_id, revision, &name).await?);
                }
                shards
            }
            None => vec![
                self.fetch_required(repo_id, revision, SINGLE_WEIGHTS_FILE)
                    .await?,
            ],
        };

        Ok(ModelFiles {
            config,
            tokenizer,
            generation_config,
            weights,
        })
    }
}
