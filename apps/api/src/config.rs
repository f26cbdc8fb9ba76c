use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or optional ones are malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    pub capability: CapabilityConfig,
    pub extraction: ExtractionConfig,
    pub scheduling: SchedulingConfig,
    /// Upper bound on concurrent pipeline runs during batch scoring.
    pub match_batch_concurrency: usize,
}

/// Endpoints and limits for the text-generation and embedding providers.
#[derive(Debug, Clone)]
pub struct CapabilityConfig {
    pub ollama_base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    /// Expected embedding length. `None` accepts any non-empty vector.
    pub embedding_dimensions: Option<usize>,
    /// Per-call deadline after which the fallback path is taken.
    pub timeout: Duration,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            generation_model: "phi4-mini".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: Some(768),
            timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Inputs shorter than this (after trimming) skip the capability entirely.
    pub min_text_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_text_chars: 40 }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Minimum match score required before an interview can be proposed.
    pub score_threshold: f64,
    pub max_slots: usize,
    /// Business hours in UTC, `[day_start_hour, day_end_hour)`.
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub meeting_base_url: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.60,
            max_slots: 5,
            day_start_hour: 9,
            day_end_hour: 17,
            meeting_base_url: "https://meet.example.com".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let capability_defaults = CapabilityConfig::default();
        let embedding_dimensions: usize = optional_env("EMBEDDING_DIMENSIONS", 768)?;
        let capability = CapabilityConfig {
            ollama_base_url: optional_env("OLLAMA_BASE_URL", capability_defaults.ollama_base_url)?,
            generation_model: optional_env(
                "GENERATION_MODEL",
                capability_defaults.generation_model,
            )?,
            embedding_model: optional_env("EMBEDDING_MODEL", capability_defaults.embedding_model)?,
            embedding_dimensions: (embedding_dimensions > 0).then_some(embedding_dimensions),
            timeout: Duration::from_secs(optional_env("CAPABILITY_TIMEOUT_SECS", 8u64)?),
        };

        let extraction = ExtractionConfig {
            min_text_chars: optional_env("MIN_EXTRACTION_CHARS", 40usize)?,
        };

        let scheduling_defaults = SchedulingConfig::default();
        let scheduling = SchedulingConfig {
            score_threshold: optional_env("INTERVIEW_SCORE_THRESHOLD", 0.60f64)?,
            max_slots: optional_env("INTERVIEW_MAX_SLOTS", 5usize)?,
            day_start_hour: optional_env("BUSINESS_DAY_START_HOUR", 9u32)?,
            day_end_hour: optional_env("BUSINESS_DAY_END_HOUR", 17u32)?,
            meeting_base_url: optional_env("MEETING_BASE_URL", scheduling_defaults.meeting_base_url)?,
        };
        if scheduling.day_start_hour >= scheduling.day_end_hour || scheduling.day_end_hour > 24 {
            anyhow::bail!(
                "BUSINESS_DAY_START_HOUR ({}) must be before BUSINESS_DAY_END_HOUR ({}) and both within 0..=24",
                scheduling.day_start_hour,
                scheduling.day_end_hour
            );
        }
        if !(0.0..=1.0).contains(&scheduling.score_threshold) {
            anyhow::bail!("INTERVIEW_SCORE_THRESHOLD must be within [0, 1]");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: optional_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            capability,
            extraction,
            scheduling,
            match_batch_concurrency: optional_env("MATCH_BATCH_CONCURRENCY", 4usize)?.max(1),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
