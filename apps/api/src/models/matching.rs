use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// How the aggregate score was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    Embedding,
    Fallback,
}

impl ScoreMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMethod::Embedding => "embedding",
            ScoreMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embedding" => Ok(ScoreMethod::Embedding),
            "fallback" => Ok(ScoreMethod::Fallback),
            other => Err(format!("unknown score method '{other}'")),
        }
    }
}

/// A raw similarity paired with the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawScore {
    /// Always within [0, 1].
    pub value: f64,
    pub method: ScoreMethod,
}

/// Identity of a match record: one per (job, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsMatch {
    /// Required skills the candidate has, in the job's spelling.
    pub matched: BTreeSet<String>,
    /// Required skills the candidate lacks.
    pub gaps: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Meets,
    Below,
    Exceeds,
    Unavailable,
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meets" | "meet" | "match" | "matches" => Ok(Verdict::Meets),
            "below" | "under" | "does_not_meet" => Ok(Verdict::Below),
            "exceeds" | "exceed" | "above" => Ok(Verdict::Exceeds),
            other => Err(format!("unknown verdict '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceMatch {
    pub verdict: Verdict,
    pub rationale: String,
    /// The job's stated requirement, verbatim.
    pub required: String,
}

impl ExperienceMatch {
    pub fn unavailable(required: &str) -> Self {
        Self {
            verdict: Verdict::Unavailable,
            rationale: "unavailable".to_string(),
            required: required.to_string(),
        }
    }
}

/// Ordered academic levels; `None` means no recognizable degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    None,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationMatch {
    pub verdict: Verdict,
    pub rationale: String,
    /// `None` when the job states no degree requirement.
    pub required_level: Option<DegreeLevel>,
    pub highest_level: DegreeLevel,
}

/// The decomposed, explainable outcome of matching one job with one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    /// Within [0, 1].
    pub score: f64,
    pub skills_match: SkillsMatch,
    pub experience_match: ExperienceMatch,
    pub education_match: EducationMatch,
    pub explanation: String,
    pub computed_at: DateTime<Utc>,
    pub method: ScoreMethod,
}

impl MatchResult {
    pub fn key(&self) -> MatchKey {
        MatchKey {
            job_id: self.job_id,
            candidate_id: self.candidate_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MatchRow {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub score: f64,
    pub skills_match: Json<SkillsMatch>,
    pub experience_match: Json<ExperienceMatch>,
    pub education_match: Json<EducationMatch>,
    pub explanation: String,
    pub method: String,
    pub computed_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for MatchResult {
    type Error = anyhow::Error;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        Ok(MatchResult {
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            score: row.score,
            skills_match: row.skills_match.0,
            experience_match: row.experience_match.0,
            education_match: row.education_match.0,
            explanation: row.explanation,
            computed_at: row.computed_at,
            method: row.method.parse().map_err(anyhow::Error::msg)?,
        })
    }
}
