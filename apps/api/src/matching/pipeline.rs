//! computeMatch: score → explain → upsert, for one pair or one job against many
//! candidates. Only a fully assembled `MatchResult` ever reaches the store; a
//! run dropped mid-way writes nothing.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::explainer::MatchExplainer;
use crate::matching::scorer::SimilarityScorer;
use crate::matching::store::MatchStore;
use crate::models::matching::MatchResult;
use crate::models::profile::{CandidateProfile, JobProfile};

pub struct MatchPipeline {
    scorer: SimilarityScorer,
    explainer: MatchExplainer,
    store: Arc<dyn MatchStore>,
    batch_concurrency: usize,
}

impl MatchPipeline {
    pub fn new(
        scorer: SimilarityScorer,
        explainer: MatchExplainer,
        store: Arc<dyn MatchStore>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            scorer,
            explainer,
            store,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    /// Scores, explains and persists one pair. Returns the stored record.
    pub async fn compute(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
    ) -> Result<MatchResult, AppError> {
        let raw = self.scorer.score(job, candidate).await;
        let result = self.explainer.explain(job, candidate, raw).await;
        let stored = self.store.upsert(&result).await?;

        info!(
            job_id = %job.id,
            candidate_id = %candidate.id,
            score = stored.score,
            method = %stored.method,
            "Match computed"
        );
        Ok(stored)
    }

    /// Matches one job against every given candidate with bounded concurrency.
    /// Pairs that fail to persist are logged and left out. Best score first.
    pub async fn compute_for_job(
        self: &Arc<Self>,
        job: &JobProfile,
        candidates: Vec<CandidateProfile>,
    ) -> Vec<MatchResult> {
        let job = Arc::new(job.clone());
        let permits = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let pipeline = Arc::clone(self);
            let job = Arc::clone(&job);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                match pipeline.compute(&job, &candidate).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!(
                            job_id = %job.id,
                            candidate_id = %candidate.id,
                            "Batch match failed: {e}"
                        );
                        None
                    }
                }
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => warn!("Batch match task aborted: {e}"),
            }
        }

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.candidate_id.cmp(&b.candidate_id))
        });
        info!(job_id = %job.id, matched = results.len(), "Batch match finished");
        results
    }
}
