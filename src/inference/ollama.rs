// src/inference/ollama.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::errors::{CheckerError, Result};
use crate::inference::{InferenceBackend, strip_prompt_echo};

/// A backend that delegates generation to a local Ollama server.
pub struct OllamaBackend {
    client: Client,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
    seed: u64,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    raw: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    /// Creates a new `OllamaBackend`.
    pub fn new(client: Client, api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Checks that the server knows the configured model.
    pub async fn verify(&self) -> Result<()> {
        let url = self.url("/api/show");
        log::info!("Checking Ollama model '{}' at {}", self.model, url);

        let resp = self
            .client
            .post(&url)
            .json(&ShowRequest { model: &self.model })
            .send()
            .await?;

        let status = resp.status();
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
        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    /// Calls the Ollama API with the raw prompt and greedy decoding.
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let url = self.url("/api/generate");

        log::debug!("Calling Ollama: {} with model: {}", url, self.model);

        let body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            raw: true,
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: max_new_tokens,
                seed: 0,
            },
        };

        let start = Instant::now();

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::debug!("Ollama response status: {} ({}ms)", status, latency_ms);

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

        // Empty completions pass through as empty text.
        let ollama_resp: OllamaResponse = resp.json().await?;
        Ok(strip_prompt_echo(&ollama_resp.response, prompt, ""))
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP request with `status` and a JSON `body`, returning the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn empty_completion_is_returned_as_empty_text() {
        let base = serve_once("200 OK", r#"{"response":"","done":true}"#).await;
        let backend = OllamaBackend::new(Client::new(), base, "qwen2.5:0.5b");

        let out = backend.generate("Условие", 16).await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn completion_text_is_trimmed() {
        let base = serve_once("200 OK", r#"{"response":"\nВердикт: верно\n","done":true}"#).await;
        let backend = OllamaBackend::new(Client::new(), base, "qwen2.5:0.5b");

        let out = backend.generate("Условие", 16).await.unwrap();
        assert_eq!(out, "Вердикт: верно");
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let base = serve_once("404 Not Found", r#"{"error":"model not found"}"#).await;
        let backend = OllamaBackend::new(Client::new(), base, "missing");

        match backend.generate("Условие", 16).await {
            Err(CheckerError::ApiError { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("model not found"));
            }
            other => panic!("expected ApiError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn request_disables_templating_and_sampling() {
        let body = OllamaRequest {
            model: "qwen2.5:0.5b",
            prompt: "Условие",
            stream: false,
            raw: true,
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: 220,
                seed: 0,
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "qwen2.5:0.5b",
                "prompt": "Условие",
                "stream": false,
                "raw": true,
                "options": { "temperature": 0.0, "num_predict": 220, "seed": 0 }
            })
        );
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let backend = OllamaBackend::new(Client::new(), "http://localhost:11434/", "m");
        assert_eq!(backend.url("/api/generate"), "http://localhost:11434/api/generate");
    }
}
