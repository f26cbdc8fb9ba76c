//! MatchExplainer: raw score → decomposed, human-readable `MatchResult`.
//!
//! Skills and education are rule-based and deterministic. Experience verdict
//! and explanation prose come from one capability call; when that call fails
//! the experience breakdown is `Unavailable` and the prose is templated.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::capability::{extract_json_object, with_timeout, TextGeneration};
use crate::extraction::heuristics::token_string;
use crate::matching::canonical::{candidate_text, job_text};
use crate::matching::education::education_match;
use crate::matching::prompts::{ASSESSMENT_PROMPT, ASSESSMENT_SCHEMA_HINT};
use crate::matching::skills::SkillMatcher;
use crate::models::matching::{
    EducationMatch, ExperienceMatch, MatchResult, RawScore, SkillsMatch, Verdict,
};
use crate::models::profile::{CandidateProfile, JobProfile};

/// What the model contributed. Either part may be missing independently.
#[derive(Debug, Default)]
struct Assessment {
    experience: Option<ExperienceMatch>,
    explanation: Option<String>,
}

pub struct MatchExplainer {
    generator: Arc<dyn TextGeneration>,
    skills: Arc<dyn SkillMatcher>,
    timeout: Duration,
}

impl MatchExplainer {
    pub fn new(
        generator: Arc<dyn TextGeneration>,
        skills: Arc<dyn SkillMatcher>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            skills,
            timeout,
        }
    }

    pub async fn explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        raw: RawScore,
    ) -> MatchResult {
        let skills_match = self
            .skills
            .compare(&job.fields.required_skills, &candidate.fields.skills);
        let education_match = education_match(job, candidate);

        let assessment = self.assess(job, candidate, raw, &skills_match).await;
        let experience_match = assessment
            .experience
            .unwrap_or_else(|| ExperienceMatch::unavailable(&job.fields.required_experience));
        let explanation = match assessment.explanation {
            Some(prose) => ensure_skill_references(prose, &skills_match),
            None => template_explanation(raw.value, &skills_match, &education_match),
        };

        MatchResult {
            job_id: job.id,
            candidate_id: candidate.id,
            score: raw.value,
            skills_match,
            experience_match,
            education_match,
            explanation,
            computed_at: Utc::now(),
            method: raw.method,
        }
    }

    async fn assess(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        raw: RawScore,
        skills_match: &SkillsMatch,
    ) -> Assessment {
        let prompt = ASSESSMENT_PROMPT
            .replace("{required_experience}", or_none(&job.fields.required_experience))
            .replace("{score}", &format!("{:.0}", raw.value * 100.0))
            .replace("{matched}", or_none(&join(&skills_match.matched)))
            .replace("{gaps}", or_none(&join(&skills_match.gaps)))
            .replace("{job}", &job_text(job))
            .replace("{candidate}", &candidate_text(candidate));

        let output = match with_timeout(
            self.timeout,
            self.generator.generate(&prompt, Some(ASSESSMENT_SCHEMA_HINT)),
        )
        .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    job_id = %job.id,
                    candidate_id = %candidate.id,
                    reason = e.reason(),
                    "Assessment capability call failed: {e}"
                );
                return Assessment::default();
            }
        };

        let assessment = parse_assessment(&output, &job.fields.required_experience);
        if assessment.experience.is_none() {
            warn!(
                job_id = %job.id,
                candidate_id = %candidate.id,
                "Assessment had no usable experience verdict"
            );
        }
        assessment
    }
}

fn parse_assessment(output: &str, required_experience: &str) -> Assessment {
    let Some(Value::Object(obj)) =
        extract_json_object(output).and_then(|json| serde_json::from_str::<Value>(json).ok())
    else {
        return Assessment::default();
    };

    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let experience = text("experience_verdict")
        .and_then(|v| v.parse::<Verdict>().ok())
        .map(|verdict| ExperienceMatch {
            verdict,
            rationale: text("experience_rationale").unwrap_or_default(),
            required: required_experience.to_string(),
        });

    Assessment {
        experience,
        explanation: text("explanation"),
    }
}

/// Appends a concrete skills sentence when the prose names no matched skill or
/// no gap, as long as both sets are non-empty. Skills count as named only as
/// whole tokens: "good" does not name "Go".
fn ensure_skill_references(explanation: String, skills: &SkillsMatch) -> String {
    if skills.matched.is_empty() || skills.gaps.is_empty() {
        return explanation;
    }
    let prose = token_string(&explanation);
    let mentions = |set: &BTreeSet<String>| set.iter().any(|s| prose.contains(&token_string(s)));
    if mentions(&skills.matched) && mentions(&skills.gaps) {
        return explanation;
    }
    format!("{} {}", explanation.trim_end(), skills_sentence(skills))
}

fn template_explanation(score: f64, skills: &SkillsMatch, education: &EducationMatch) -> String {
    format!(
        "Overall match {:.0}%. {} {}",
        score * 100.0,
        skills_sentence(skills),
        education.rationale
    )
}

fn skills_sentence(skills: &SkillsMatch) -> String {
    let total = skills.matched.len() + skills.gaps.len();
    match (skills.matched.is_empty(), skills.gaps.is_empty()) {
        (true, true) => "The job lists no required skills.".to_string(),
        (false, true) => format!(
            "Covers all {total} required skills: {}.",
            join(&skills.matched)
        ),
        (true, false) => format!(
            "Covers none of the required skills; missing {}.",
            join(&skills.gaps)
        ),
        (false, false) => format!(
            "Covers {} of {total} required skills ({}); missing {}.",
            skills.matched.len(),
            join(&skills.matched),
            join(&skills.gaps)
        ),
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        "none stated"
    } else {
        text
    }
}
