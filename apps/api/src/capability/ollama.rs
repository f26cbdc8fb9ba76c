//! Ollama adapter for both capability ports.
//!
//! Transport failures and 5xx/429 responses are retried at most once; the
//! caller's deadline (`with_timeout`) bounds the total wait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::{with_schema_instruction, JSON_ONLY_SYSTEM};
use super::{CapabilityError, Embedding, TextGeneration};
use crate::config::CapabilityConfig;

/// Inputs longer than this are cut before embedding.
pub const MAX_EMBEDDING_CHARS: usize = 8192;
/// One initial attempt plus one retry.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 250;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// HTTP client for a locally hosted Ollama runtime.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    generation_model: String,
    embedding_model: String,
}

impl OllamaClient {
    pub fn new(config: &CapabilityConfig) -> Result<Self, CapabilityError> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            generation_model: config.generation_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    /// POSTs `body` to `path`, retrying once on transport errors, 429 and 5xx.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, CapabilityError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<CapabilityError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!("Capability call to {path} failed, retrying once after {RETRY_BACKOFF_MS}ms");
                tokio::time::sleep(std::time::Duration::from_millis(RETRY_BACKOFF_MS)).await;
            }

            let response = match self.client.post(&url).json(body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CapabilityError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Ollama returned {status} for {path}: {body}");
                last_error = Some(CapabilityError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OllamaError>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(CapabilityError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<R>().await?);
        }

        Err(last_error.unwrap_or(CapabilityError::EmptyContent))
    }
}

#[async_trait]
impl TextGeneration for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        schema_hint: Option<&str>,
    ) -> Result<String, CapabilityError> {
        let prompt = match schema_hint {
            Some(hint) => with_schema_instruction(prompt, hint),
            None => prompt.to_string(),
        };
        let request = GenerateRequest {
            model: &self.generation_model,
            prompt: &prompt,
            system: schema_hint.map(|_| JSON_ONLY_SYSTEM),
            stream: false,
            format: schema_hint.map(|_| "json"),
            options: GenerateOptions { temperature: 0.0 },
        };

        let response: GenerateResponse = self.post("/api/generate", &request).await?;
        debug!(
            "Generation succeeded: model={}, eval_count={:?}",
            self.generation_model, response.eval_count
        );

        if response.response.trim().is_empty() {
            return Err(CapabilityError::EmptyContent);
        }
        Ok(response.response)
    }
}

#[async_trait]
impl Embedding for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        if text.trim().is_empty() {
            return Err(CapabilityError::EmptyContent);
        }
        let text = truncate_chars(text, MAX_EMBEDDING_CHARS);

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };
        let response: EmbeddingResponse = self.post("/api/embeddings", &request).await?;
        debug!(
            "Embedding succeeded: model={}, dimensions={}",
            self.embedding_model,
            response.embedding.len()
        );
        Ok(response.embedding)
    }
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            warn!("Embedding input truncated to {max_chars} characters");
            &text[..idx]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("rust", 10), "rust");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        let text = "résumé";
        assert_eq!(truncate_chars(text, 2), "ré");
    }

    #[test]
    fn test_generate_request_omits_format_without_schema() {
        let request = GenerateRequest {
            model: "phi4-mini",
            prompt: "hello",
            system: None,
            stream: false,
            format: None,
            options: GenerateOptions { temperature: 0.0 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("format").is_none());
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_embedding_response_tolerates_missing_field() {
        let parsed: EmbeddingResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.embedding.is_empty());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = CapabilityConfig {
            ollama_base_url: "http://localhost:11434/".to_string(),
            ..CapabilityConfig::default()
        };
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_embed_rejects_empty_text_locally() {
        let client = OllamaClient::new(&CapabilityConfig::default()).unwrap();
        let result = client.embed("   ").await;
        assert!(matches!(result, Err(CapabilityError::EmptyContent)));
    }
}
