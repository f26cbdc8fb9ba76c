mod capability;
mod config;
mod db;
mod errors;
mod extraction;
mod matching;
mod models;
mod profiles;
mod routes;
mod scheduling;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::capability::OllamaClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::TextExtractor;
use crate::matching::explainer::MatchExplainer;
use crate::matching::pipeline::MatchPipeline;
use crate::matching::scorer::SimilarityScorer;
use crate::matching::skills::ExactSkillMatcher;
use crate::matching::store::PgMatchStore;
use crate::routes::build_router;
use crate::scheduling::InterviewScheduler;
use crate::state::AppState;
use crate::storage::ResumeArchive;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruit-match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let resumes = ResumeArchive::new(s3, config.s3_bucket.clone());
    info!("S3 client initialized");

    // Capability providers: one Ollama client serves both ports
    let ollama = Arc::new(OllamaClient::new(&config.capability)?);
    info!(
        "Ollama client initialized (generation: {}, embeddings: {})",
        config.capability.generation_model, config.capability.embedding_model
    );
    let timeout = config.capability.timeout;
    let skills = Arc::new(ExactSkillMatcher);

    let extractor = Arc::new(TextExtractor::new(
        ollama.clone(),
        config.extraction.clone(),
        timeout,
    ));
    let scorer = SimilarityScorer::new(
        ollama.clone(),
        ollama.clone(),
        skills.clone(),
        config.capability.embedding_dimensions,
        timeout,
    );
    let explainer = MatchExplainer::new(ollama, skills, timeout);
    let pipeline = Arc::new(MatchPipeline::new(
        scorer,
        explainer,
        Arc::new(PgMatchStore::new(db.clone())),
        config.match_batch_concurrency,
    ));
    let scheduler = Arc::new(InterviewScheduler::new(config.scheduling.clone()));

    // Build app state
    let state = AppState {
        db,
        resumes,
        extractor,
        pipeline,
        scheduler,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruit-match-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
