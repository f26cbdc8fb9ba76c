use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a profile's fields came from the model or from the heuristic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionQuality {
    Complete,
    Degraded,
}

impl ExtractionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionQuality::Complete => "complete",
            ExtractionQuality::Degraded => "degraded",
        }
    }
}

impl fmt::Display for ExtractionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(ExtractionQuality::Complete),
            "degraded" => Ok(ExtractionQuality::Degraded),
            other => Err(format!("unknown extraction quality '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFields {
    pub summary: String,
    pub required_skills: BTreeSet<String>,
    pub required_experience: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub employer: String,
    pub title: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub education: Vec<Education>,
    pub work_experience: Vec<WorkExperience>,
    pub skills: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub phone: Option<String>,
}

/// A job posting plus the fields extracted from its description.
/// Immutable once created; resubmission creates a new profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub raw_description: String,
    pub fields: JobFields,
    pub extraction_quality: ExtractionQuality,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub name: String,
    pub contact: Contact,
    pub raw_resume: String,
    /// Object key of the archived résumé file, when one was uploaded.
    pub resume_key: Option<String>,
    pub fields: CandidateFields,
    pub extraction_quality: ExtractionQuality,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub raw_description: String,
    pub fields: Json<JobFields>,
    pub extraction_quality: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobProfile {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(JobProfile {
            id: row.id,
            title: row.title,
            company: row.company,
            raw_description: row.raw_description,
            fields: row.fields.0,
            extraction_quality: row
                .extraction_quality
                .parse()
                .map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub raw_resume: String,
    pub resume_key: Option<String>,
    pub fields: Json<CandidateFields>,
    pub extraction_quality: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for CandidateProfile {
    type Error = anyhow::Error;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(CandidateProfile {
            id: row.id,
            name: row.name,
            contact: Contact {
                email: row.email,
                phone: row.phone,
            },
            raw_resume: row.raw_resume,
            resume_key: row.resume_key,
            fields: row.fields.0,
            extraction_quality: row
                .extraction_quality
                .parse()
                .map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
        })
    }
}

/// Collapses runs of whitespace and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds a skill set from raw strings: whitespace-normalized, empties dropped,
/// case-insensitive duplicates collapsed onto the first spelling seen.
pub fn normalize_skill_set<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut skills = BTreeSet::new();
    for item in raw {
        let skill = normalize_whitespace(item.as_ref());
        if skill.is_empty() {
            continue;
        }
        if seen.insert(skill.to_lowercase()) {
            skills.insert(skill);
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_skill_set_dedups_case_insensitively() {
        let skills = normalize_skill_set(["Python", "python ", "  SQL", ""]);
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("Python"));
        assert!(skills.contains("SQL"));
    }

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("  machine \t learning\n"), "machine learning");
    }

    #[test]
    fn test_extraction_quality_round_trips_through_str() {
        for quality in [ExtractionQuality::Complete, ExtractionQuality::Degraded] {
            assert_eq!(quality.as_str().parse::<ExtractionQuality>(), Ok(quality));
        }
        assert!("partial".parse::<ExtractionQuality>().is_err());
    }

    #[test]
    fn test_job_row_with_unknown_quality_is_rejected() {
        let row = JobRow {
            id: Uuid::new_v4(),
            title: "Data Engineer".to_string(),
            company: "Acme".to_string(),
            raw_description: "Build pipelines".to_string(),
            fields: Json(JobFields::default()),
            extraction_quality: "bogus".to_string(),
            created_at: Utc::now(),
        };
        assert!(JobProfile::try_from(row).is_err());
    }
}
