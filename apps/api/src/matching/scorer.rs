//! SimilarityScorer: one job/candidate pair → a raw score in [0, 1].
//!
//! Preference order:
//! 1. Cosine similarity of the two canonical texts' embeddings (`Embedding`).
//! 2. A 0–100 compatibility rating from the text-generation capability.
//! 3. Required-skill coverage ratio, when the rating call fails as well.
//!
//! Provider trouble never surfaces as an error; it shows up as
//! `ScoreMethod::Fallback` on the returned score.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::capability::{
    extract_json_object, with_timeout, CapabilityError, Embedding, TextGeneration,
};
use crate::matching::canonical::{candidate_text, job_text};
use crate::matching::prompts::{RATING_PROMPT, RATING_SCHEMA_HINT};
use crate::matching::skills::SkillMatcher;
use crate::models::matching::{RawScore, ScoreMethod};
use crate::models::profile::{CandidateProfile, JobProfile};

pub struct SimilarityScorer {
    embedder: Arc<dyn Embedding>,
    generator: Arc<dyn TextGeneration>,
    skills: Arc<dyn SkillMatcher>,
    /// Vectors of any other length are treated as malformed. `None` skips the check.
    expected_dimensions: Option<usize>,
    timeout: Duration,
}

impl SimilarityScorer {
    pub fn new(
        embedder: Arc<dyn Embedding>,
        generator: Arc<dyn TextGeneration>,
        skills: Arc<dyn SkillMatcher>,
        expected_dimensions: Option<usize>,
        timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            generator,
            skills,
            expected_dimensions,
            timeout,
        }
    }

    pub async fn score(&self, job: &JobProfile, candidate: &CandidateProfile) -> RawScore {
        let job_repr = job_text(job);
        let candidate_repr = candidate_text(candidate);

        match self.embedding_similarity(&job_repr, &candidate_repr).await {
            Ok(value) => {
                debug!(
                    job_id = %job.id,
                    candidate_id = %candidate.id,
                    score = value,
                    "Scored via embeddings"
                );
                return RawScore {
                    value,
                    method: ScoreMethod::Embedding,
                };
            }
            Err(e) => warn!(
                job_id = %job.id,
                candidate_id = %candidate.id,
                reason = e.reason(),
                "Embedding unavailable, falling back to rating: {e}"
            ),
        }

        let value = match self.rating(&job_repr, &candidate_repr).await {
            Some(value) => value,
            None => {
                let coverage = self
                    .skills
                    .coverage(&job.fields.required_skills, &candidate.fields.skills);
                warn!(
                    job_id = %job.id,
                    candidate_id = %candidate.id,
                    "Rating unavailable, using skill coverage {coverage:.2}"
                );
                coverage
            }
        };

        RawScore {
            value: value.clamp(0.0, 1.0),
            method: ScoreMethod::Fallback,
        }
    }

    async fn embedding_similarity(
        &self,
        job_repr: &str,
        candidate_repr: &str,
    ) -> Result<f64, CapabilityError> {
        let (job_vec, candidate_vec) = tokio::join!(
            with_timeout(self.timeout, self.embedder.embed(job_repr)),
            with_timeout(self.timeout, self.embedder.embed(candidate_repr)),
        );
        let job_vec = job_vec?;
        let candidate_vec = candidate_vec?;

        self.validate(&job_vec)?;
        self.validate(&candidate_vec)?;
        if job_vec.len() != candidate_vec.len() {
            return Err(CapabilityError::MalformedVector {
                reason: format!(
                    "length mismatch: {} vs {}",
                    job_vec.len(),
                    candidate_vec.len()
                ),
            });
        }
        Ok(cosine_similarity(&job_vec, &candidate_vec))
    }

    fn validate(&self, vector: &[f32]) -> Result<(), CapabilityError> {
        let reason = match self.expected_dimensions {
            _ if vector.is_empty() => "empty vector".to_string(),
            Some(d) if d != vector.len() => {
                format!("expected {d} dimensions, got {}", vector.len())
            }
            _ if vector.iter().any(|x| !x.is_finite()) => "non-finite component".to_string(),
            _ if vector.iter().all(|x| *x == 0.0) => "all-zero vector".to_string(),
            _ => return Ok(()),
        };
        Err(CapabilityError::MalformedVector { reason })
    }

    async fn rating(&self, job_repr: &str, candidate_repr: &str) -> Option<f64> {
        let prompt = RATING_PROMPT
            .replace("{job}", job_repr)
            .replace("{candidate}", candidate_repr);

        match with_timeout(
            self.timeout,
            self.generator.generate(&prompt, Some(RATING_SCHEMA_HINT)),
        )
        .await
        {
            Ok(output) => {
                let rating = parse_rating(&output);
                if rating.is_none() {
                    warn!("Rating output had no usable number");
                }
                rating
            }
            Err(e) => {
                warn!(reason = e.reason(), "Rating capability call failed: {e}");
                None
            }
        }
    }
}

/// Cosine similarity mapped onto [0, 1]; opposition counts as no relation.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    let sim = dot / denominator;
    if sim.is_nan() {
        0.0
    } else {
        sim.clamp(0.0, 1.0)
    }
}

/// 0–100 rating from model output → [0, 1].
/// Accepts `{"rating": n}` / `{"score": n}` (number or numeric string), else
/// the first number in the text.
pub fn parse_rating(output: &str) -> Option<f64> {
    let from_json = extract_json_object(output)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .and_then(|value| {
            ["rating", "score"]
                .iter()
                .find_map(|key| match value.get(key)? {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
                    _ => None,
                })
        });

    let rating = from_json.or_else(|| first_number(output))?;
    rating
        .is_finite()
        .then(|| rating.clamp(0.0, 100.0) / 100.0)
}

fn first_number(text: &str) -> Option<f64> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .map(|t| t.trim_matches('.'))
        .find_map(|t| t.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::fakes::{
        ConstantEmbedding, FailingEmbedding, FixedGeneration, HashingEmbedding,
        ScriptedGeneration, SlowEmbedding,
    };
    use crate::matching::skills::ExactSkillMatcher;
    use crate::matching::tests_support::{candidate, job};

    fn scorer(
        embedder: Arc<dyn Embedding>,
        generator: Arc<dyn TextGeneration>,
        dimensions: Option<usize>,
    ) -> SimilarityScorer {
        SimilarityScorer::new(
            embedder,
            generator,
            Arc::new(ExactSkillMatcher),
            dimensions,
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_identical_representations_score_one() {
        let scorer = scorer(
            Arc::new(HashingEmbedding { dimensions: 64 }),
            Arc::new(ScriptedGeneration::unavailable()),
            Some(64),
        );
        let job = job(&["Python", "PostgreSQL"], "3 years");
        let candidate = candidate(&["Python"], &["BSc Computer Science"]);

        for text in [job_text(&job), candidate_text(&candidate)] {
            let similarity = scorer.embedding_similarity(&text, &text).await.unwrap();
            assert!((similarity - 1.0).abs() < 1e-6, "{similarity}");
        }
    }

    #[tokio::test]
    async fn test_hashing_embeddings_stay_in_unit_range() {
        let scorer = scorer(
            Arc::new(HashingEmbedding { dimensions: 64 }),
            Arc::new(ScriptedGeneration::unavailable()),
            Some(64),
        );
        let pairs = [
            (job(&["Python", "SQL"], "5 years"), candidate(&["Go"], &["BSc Physics"])),
            (job(&[], ""), candidate(&[], &[])),
            (job(&["Rust"], "2 years"), candidate(&["Rust"], &["MSc Computer Science"])),
        ];
        for (job, candidate) in &pairs {
            let score = scorer.score(job, candidate).await;
            assert_eq!(score.method, ScoreMethod::Embedding);
            assert!((0.0..=1.0).contains(&score.value));
        }
    }

    #[tokio::test]
    async fn test_embedding_error_falls_back_to_rating() {
        let scorer = scorer(
            Arc::new(FailingEmbedding),
            Arc::new(FixedGeneration(r#"{"rating": 85}"#.to_string())),
            Some(3),
        );
        let score = scorer
            .score(&job(&["Python"], "3 years"), &candidate(&["Python"], &[]))
            .await;
        assert_eq!(score.method, ScoreMethod::Fallback);
        assert!((score.value - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_all_providers_down_uses_skill_coverage() {
        let scorer = scorer(
            Arc::new(FailingEmbedding),
            Arc::new(ScriptedGeneration::unavailable()),
            Some(3),
        );
        let score = scorer
            .score(
                &job(&["Python", "SQL"], "3 years"),
                &candidate(&["python", "Go"], &[]),
            )
            .await;
        assert_eq!(score.method, ScoreMethod::Fallback);
        assert_eq!(score.value, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_embedding_timeout_falls_back() {
        let scorer = scorer(
            Arc::new(SlowEmbedding(Duration::from_secs(60))),
            Arc::new(FixedGeneration("40".to_string())),
            Some(3),
        );
        let score = scorer
            .score(&job(&["Python"], "3 years"), &candidate(&["Python"], &[]))
            .await;
        assert_eq!(score.method, ScoreMethod::Fallback);
        assert!((score.value - 0.40).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_vectors_fall_back() {
        for vector in [vec![0.0, 0.0, 0.0], vec![1.0, 0.0], vec![f32::NAN, 1.0, 0.0]] {
            let scorer = scorer(
                Arc::new(ConstantEmbedding(vector)),
                Arc::new(FixedGeneration(r#"{"rating": 10}"#.to_string())),
                Some(3),
            );
            let score = scorer
                .score(&job(&["Python"], "3 years"), &candidate(&["Python"], &[]))
                .await;
            assert_eq!(score.method, ScoreMethod::Fallback);
        }
    }

    #[tokio::test]
    async fn test_rating_prompt_carries_both_profiles() {
        let generator = Arc::new(ScriptedGeneration::new([r#"{"rating": 55}"#]));
        let scorer = scorer(Arc::new(FailingEmbedding), generator.clone(), None);
        scorer
            .score(&job(&["Kafka"], "3 years"), &candidate(&["Elixir"], &[]))
            .await;
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("SKILLS: Kafka"));
        assert!(prompt.contains("SKILLS: Elixir"));
    }

    #[test]
    fn test_cosine_similarity_clamps_opposition_to_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 1.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rating_variants() {
        assert_eq!(parse_rating(r#"{"rating": 72}"#), Some(0.72));
        assert_eq!(parse_rating(r#"{"score": "64"}"#), Some(0.64));
        assert_eq!(parse_rating("I would rate this 30 out of 100."), Some(0.30));
        assert_eq!(parse_rating(r#"{"rating": 250}"#), Some(1.0));
        assert_eq!(parse_rating(r#"{"rating": -20}"#), Some(0.0));
        assert_eq!(parse_rating("no idea"), None);
    }
}
