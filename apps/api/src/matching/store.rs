//! MatchStore: at most one authoritative `MatchResult` per (job, candidate).
//!
//! Upserts replace the whole record in a single step, so concurrent
//! recomputations of one key can never leave a score from one run next to an
//! explanation from another. A write older than the stored record
//! (`computed_at` earlier) is ignored rather than clobbering newer data.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::matching::{MatchKey, MatchResult, MatchRow};

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Inserts or replaces the record for `result.key()`.
    /// Returns the record that is authoritative after the write.
    async fn upsert(&self, result: &MatchResult) -> Result<MatchResult, AppError>;

    async fn get(&self, key: MatchKey) -> Result<MatchResult, AppError>;

    /// All records, best score first.
    async fn list(&self) -> Result<Vec<MatchResult>, AppError>;

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<MatchResult>, AppError>;

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<MatchResult>, AppError>;
}

fn not_found(key: MatchKey) -> AppError {
    AppError::NotFound(format!(
        "No match for job {} and candidate {}",
        key.job_id, key.candidate_id
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

const SELECT_COLUMNS: &str = "SELECT job_id, candidate_id, score, skills_match, experience_match, \
     education_match, explanation, method, computed_at FROM match_results";

pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str, id: Option<Uuid>) -> Result<Vec<MatchResult>, AppError> {
        let query = sqlx::query_as::<_, MatchRow>(sql);
        let query = match id {
            Some(id) => query.bind(id),
            None => query,
        };
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| MatchResult::try_from(row).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn upsert(&self, result: &MatchResult) -> Result<MatchResult, AppError> {
        // Single statement: the row is replaced as a whole or not at all.
        let written = sqlx::query_as::<_, MatchRow>(
            r#"
            INSERT INTO match_results
                (job_id, candidate_id, score, skills_match, experience_match,
                 education_match, explanation, method, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (job_id, candidate_id) DO UPDATE SET
                score = EXCLUDED.score,
                skills_match = EXCLUDED.skills_match,
                experience_match = EXCLUDED.experience_match,
                education_match = EXCLUDED.education_match,
                explanation = EXCLUDED.explanation,
                method = EXCLUDED.method,
                computed_at = EXCLUDED.computed_at
            WHERE match_results.computed_at <= EXCLUDED.computed_at
            RETURNING job_id, candidate_id, score, skills_match, experience_match,
                      education_match, explanation, method, computed_at
            "#,
        )
        .bind(result.job_id)
        .bind(result.candidate_id)
        .bind(result.score)
        .bind(Json(&result.skills_match))
        .bind(Json(&result.experience_match))
        .bind(Json(&result.education_match))
        .bind(&result.explanation)
        .bind(result.method.as_str())
        .bind(result.computed_at)
        .fetch_optional(&self.pool)
        .await?;

        match written {
            Some(row) => Ok(MatchResult::try_from(row)?),
            None => {
                tracing::debug!(
                    job_id = %result.job_id,
                    candidate_id = %result.candidate_id,
                    "Ignored stale match write"
                );
                self.get(result.key()).await
            }
        }
    }

    async fn get(&self, key: MatchKey) -> Result<MatchResult, AppError> {
        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "{SELECT_COLUMNS} WHERE job_id = $1 AND candidate_id = $2"
        ))
        .bind(key.job_id)
        .bind(key.candidate_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(key))?;

        Ok(MatchResult::try_from(row)?)
    }

    async fn list(&self) -> Result<Vec<MatchResult>, AppError> {
        self.fetch_all(
            &format!("{SELECT_COLUMNS} ORDER BY score DESC, job_id, candidate_id"),
            None,
        )
        .await
    }

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<MatchResult>, AppError> {
        self.fetch_all(
            &format!("{SELECT_COLUMNS} WHERE job_id = $1 ORDER BY score DESC, candidate_id"),
            Some(job_id),
        )
        .await
    }

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<MatchResult>, AppError> {
        self.fetch_all(
            &format!("{SELECT_COLUMNS} WHERE candidate_id = $1 ORDER BY score DESC, job_id"),
            Some(candidate_id),
        )
        .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory (tests)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub use memory::InMemoryMatchStore;


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::matching::{
        DegreeLevel, EducationMatch, ExperienceMatch, ScoreMethod, SkillsMatch, Verdict,
    };

    fn result(job_id: Uuid, candidate_id: Uuid, score: f64, minute: i64) -> MatchResult {
        MatchResult {
            job_id,
            candidate_id,
            score,
            skills_match: SkillsMatch::default(),
            experience_match: ExperienceMatch::unavailable("3 years"),
            education_match: EducationMatch {
                verdict: Verdict::Meets,
                rationale: "No degree requirement stated.".to_string(),
                required_level: None,
                highest_level: DegreeLevel::None,
            },
            explanation: format!("score {score}"),
            computed_at: Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap()
                + Duration::minutes(minute),
            method: ScoreMethod::Embedding,
        }
    }

    #[tokio::test]
    async fn test_double_upsert_keeps_one_record_with_latest_score() {
        let store = InMemoryMatchStore::default();
        let (job, candidate) = (Uuid::new_v4(), Uuid::new_v4());

        store.upsert(&result(job, candidate, 0.4, 0)).await.unwrap();
        store.upsert(&result(job, candidate, 0.9, 1)).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 0.9);
        let stored = store.get(all[0].key()).await.unwrap();
        assert_eq!(stored.explanation, "score 0.9");
    }

    #[tokio::test]
    async fn test_stale_write_is_ignored() {
        let store = InMemoryMatchStore::default();
        let (job, candidate) = (Uuid::new_v4(), Uuid::new_v4());

        store.upsert(&result(job, candidate, 0.8, 5)).await.unwrap();
        let authoritative = store.upsert(&result(job, candidate, 0.1, 2)).await.unwrap();

        assert_eq!(authoritative.score, 0.8);
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_not_found() {
        let store = InMemoryMatchStore::default();
        let key = MatchKey {
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
        };
        assert!(matches!(store.get(key).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lists_are_filtered_and_best_first() {
        let store = InMemoryMatchStore::default();
        let (job_a, job_b) = (Uuid::new_v4(), Uuid::new_v4());
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());

        store.upsert(&result(job_a, c1, 0.3, 0)).await.unwrap();
        store.upsert(&result(job_a, c2, 0.7, 0)).await.unwrap();
        store.upsert(&result(job_b, c1, 0.5, 0)).await.unwrap();

        let for_a = store.list_for_job(job_a).await.unwrap();
        assert_eq!(for_a.iter().map(|r| r.score).collect::<Vec<_>>(), vec![0.7, 0.3]);

        let for_c1 = store.list_for_candidate(c1).await.unwrap();
        assert_eq!(for_c1.iter().map(|r| r.score).collect::<Vec<_>>(), vec![0.5, 0.3]);

        assert_eq!(store.list().await.unwrap()[0].score, 0.7);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_never_mix_records() {
        let store = Arc::new(InMemoryMatchStore::default());
        let (job, candidate) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..20 {
            let store = store.clone();
            tasks.spawn(async move {
                let score = f64::from(i) / 20.0;
                store.upsert(&result(job, candidate, score, i64::from(i))).await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].explanation, format!("score {}", all[0].score));
        assert_eq!(all[0].score, 19.0 / 20.0);
    }
}
