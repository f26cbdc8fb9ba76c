use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::matching::MatchResult;
use crate::models::profile::JobProfile;

const TOP_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCandidate {
    pub candidate_id: Uuid,
    pub candidate_name: Option<String>,
    pub score: f64,
}

/// Per-job summary of stored matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatchStats {
    pub job_id: Uuid,
    pub job_title: String,
    pub total_candidates: usize,
    /// Zero when nothing has been matched yet.
    pub average_score: f64,
    pub top_candidates: Vec<TopCandidate>,
}

pub fn job_match_stats(
    job: &JobProfile,
    matches: &[MatchResult],
    candidate_names: &HashMap<Uuid, String>,
) -> JobMatchStats {
    let relevant: Vec<&MatchResult> = matches.iter().filter(|m| m.job_id == job.id).collect();

    let average_score = if relevant.is_empty() {
        0.0
    } else {
        relevant.iter().map(|m| m.score).sum::<f64>() / relevant.len() as f64
    };

    let mut ranked = relevant.clone();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.candidate_id.cmp(&b.candidate_id))
    });

    JobMatchStats {
        job_id: job.id,
        job_title: job.title.clone(),
        total_candidates: relevant.len(),
        average_score,
        top_candidates: ranked
            .into_iter()
            .take(TOP_CANDIDATES)
            .map(|m| TopCandidate {
                candidate_id: m.candidate_id,
                candidate_name: candidate_names.get(&m.candidate_id).cloned(),
                score: m.score,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::matching::education::education_match;
    use crate::matching::tests_support::{candidate, job};
    use crate::models::matching::{ExperienceMatch, ScoreMethod, SkillsMatch};

    fn match_for(job: &JobProfile, candidate_id: Uuid, score: f64) -> MatchResult {
        MatchResult {
            job_id: job.id,
            candidate_id,
            score,
            skills_match: SkillsMatch::default(),
            experience_match: ExperienceMatch::unavailable(""),
            education_match: education_match(job, &candidate(&[], &[])),
            explanation: String::new(),
            computed_at: Utc::now(),
            method: ScoreMethod::Embedding,
        }
    }

    #[test]
    fn test_empty_job_has_zero_average() {
        let job = job(&["Rust"], "2 years");
        let stats = job_match_stats(&job, &[], &HashMap::new());
        assert_eq!(stats.total_candidates, 0);
        assert_eq!(stats.average_score, 0.0);
        assert!(stats.top_candidates.is_empty());
    }

    #[test]
    fn test_top_five_sorted_with_names() {
        let job = job(&["Rust"], "2 years");
        let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let scores = [0.1, 0.9, 0.5, 0.3, 0.7, 0.2, 0.8];
        let matches: Vec<MatchResult> = ids
            .iter()
            .zip(scores)
            .map(|(id, score)| match_for(&job, *id, score))
            .collect();
        let names = HashMap::from([(ids[1], "Ada".to_string())]);

        let stats = job_match_stats(&job, &matches, &names);

        assert_eq!(stats.total_candidates, 7);
        assert!((stats.average_score - 3.5 / 7.0).abs() < 1e-9);
        let top: Vec<f64> = stats.top_candidates.iter().map(|c| c.score).collect();
        assert_eq!(top, vec![0.9, 0.8, 0.7, 0.5, 0.3]);
        assert_eq!(stats.top_candidates[0].candidate_name.as_deref(), Some("Ada"));
        assert_eq!(stats.top_candidates[1].candidate_name, None);
    }

    #[test]
    fn test_other_jobs_are_ignored() {
        let other = job(&["Go"], "1 year");
        let job = job(&["Rust"], "2 years");
        let matches = vec![
            match_for(&job, Uuid::new_v4(), 0.6),
            match_for(&other, Uuid::new_v4(), 0.2),
        ];
        let stats = job_match_stats(&job, &matches, &HashMap::new());
        assert_eq!(stats.total_candidates, 1);
        assert_eq!(stats.average_score, 0.6);
    }
}
