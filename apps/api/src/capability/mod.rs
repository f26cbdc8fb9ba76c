//! Capability ports: the only way the matching core talks to a model runtime.
//!
//! RULE: extraction, scoring, and explanation code depends on `TextGeneration`
//! and `Embedding` only. Concrete providers (see `ollama`) live behind them and
//! are chosen at startup.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod fakes;
pub mod ollama;
pub mod prompts;

pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Capability returned empty content")]
    EmptyContent,

    #[error("Capability call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed embedding vector: {reason}")]
    MalformedVector { reason: String },
}

impl CapabilityError {
    /// Short machine-friendly label used in fallback log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            CapabilityError::Http(_) => "unreachable",
            CapabilityError::Api { .. } => "api_error",
            CapabilityError::Parse(_) => "malformed_output",
            CapabilityError::EmptyContent => "empty_content",
            CapabilityError::Timeout(_) => "timeout",
            CapabilityError::MalformedVector { .. } => "malformed_vector",
        }
    }
}

/// Free-text generation. Output is never assumed to be well-formed.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// `schema_hint` is a JSON example of the expected shape, or `None` for prose.
    async fn generate(&self, prompt: &str, schema_hint: Option<&str>)
        -> Result<String, CapabilityError>;
}

/// Fixed-dimensionality text embeddings.
#[async_trait]
pub trait Embedding: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
}

/// Runs a capability call under a deadline, folding an elapsed deadline into
/// `CapabilityError::Timeout` so callers handle it like any other outage.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CapabilityError::Timeout(limit)),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the outermost `{ ... }` span, tolerating chatter before or after it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_object_ignores_surrounding_chatter() {
        let input = "Sure! Here is the profile:\n{\"skills\": [\"Rust\"]}\nHope this helps.";
        assert_eq!(extract_json_object(input), Some("{\"skills\": [\"Rust\"]}"));
    }

    #[test]
    fn test_extract_json_object_none_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_maps_elapsed_deadline() {
        let result: Result<(), CapabilityError> = with_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(CapabilityError::Timeout(_))));
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(CapabilityError::EmptyContent.reason(), "empty_content");
        assert_eq!(
            CapabilityError::Timeout(Duration::from_secs(1)).reason(),
            "timeout"
        );
    }
}
