//! In-process capability doubles for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CapabilityError, Embedding, TextGeneration};

/// Replays scripted responses in order; once exhausted, every call fails.
#[derive(Default)]
pub struct ScriptedGeneration {
    responses: Mutex<VecDeque<Result<String, ()>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGeneration {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// A provider that is always down.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGeneration for ScriptedGeneration {
    async fn generate(
        &self,
        prompt: &str,
        _schema_hint: Option<&str>,
    ) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            _ => Err(CapabilityError::Api {
                status: 503,
                message: "model runtime unavailable".to_string(),
            }),
        }
    }
}

/// Answers every prompt with the same text.
pub struct FixedGeneration(pub String);

#[async_trait]
impl TextGeneration for FixedGeneration {
    async fn generate(
        &self,
        _prompt: &str,
        _schema_hint: Option<&str>,
    ) -> Result<String, CapabilityError> {
        Ok(self.0.clone())
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowGeneration(pub Duration);

#[async_trait]
impl TextGeneration for SlowGeneration {
    async fn generate(
        &self,
        _prompt: &str,
        _schema_hint: Option<&str>,
    ) -> Result<String, CapabilityError> {
        tokio::time::sleep(self.0).await;
        Ok("{}".to_string())
    }
}

/// Deterministic bag-of-words embedding: each lowercase token is hashed into
/// one of `dimensions` buckets. Identical text yields identical vectors.
pub struct HashingEmbedding {
    pub dimensions: usize,
}

#[async_trait]
impl Embedding for HashingEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in text.split_whitespace() {
            let bucket = token
                .to_lowercase()
                .bytes()
                .fold(17usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                % self.dimensions;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Returns the same vector for every input.
pub struct ConstantEmbedding(pub Vec<f32>);

#[async_trait]
impl Embedding for ConstantEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
        Ok(self.0.clone())
    }
}

/// Always fails as if the embedding service were unreachable.
pub struct FailingEmbedding;

#[async_trait]
impl Embedding for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
        Err(CapabilityError::Api {
            status: 503,
            message: "embedding service unavailable".to_string(),
        })
    }
}

/// Sleeps past any deadline before answering.
pub struct SlowEmbedding(pub Duration);

#[async_trait]
impl Embedding for SlowEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
        tokio::time::sleep(self.0).await;
        Ok(vec![1.0, 0.0, 0.0])
    }
}
