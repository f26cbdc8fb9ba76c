use std::sync::Arc;

use sqlx::PgPool;

use crate::extraction::TextExtractor;
use crate::matching::pipeline::MatchPipeline;
use crate::scheduling::InterviewScheduler;
use crate::storage::ResumeArchive;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Original résumé uploads (S3).
    pub resumes: ResumeArchive,
    pub extractor: Arc<TextExtractor>,
    /// Scorer + explainer + match store. Providers are swapped at startup.
    pub pipeline: Arc<MatchPipeline>,
    pub scheduler: Arc<InterviewScheduler>,
}
