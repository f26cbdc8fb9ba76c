//! TextExtractor: raw job-description / résumé text → structured profile fields.
//!
//! Flow: short-circuit tiny input → prompt the model → parse leniently →
//! on unusable output retry ONCE with a corrective instruction → heuristics.
//! Never fails: the worst case is a `Degraded` extraction.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::capability::{extract_json_object, with_timeout, TextGeneration};
use crate::config::ExtractionConfig;
use crate::extraction::heuristics;
use crate::extraction::prompts::{
    CANDIDATE_EXTRACTION_PROMPT, CANDIDATE_SCHEMA_HINT, CORRECTIVE_INSTRUCTION,
    JOB_EXTRACTION_PROMPT, JOB_SCHEMA_HINT,
};
use crate::models::profile::{
    normalize_skill_set, normalize_whitespace, CandidateFields, Education, ExtractionQuality,
    JobFields, WorkExperience,
};

/// A kind of free text that can be turned into profile fields.
pub trait ProfileKind {
    type Fields;

    const LABEL: &'static str;
    const PROMPT: &'static str;
    const SCHEMA_HINT: &'static str;

    /// Parses model output; `Err` carries the problem for the corrective retry.
    fn parse(output: &str) -> Result<Self::Fields, String>;

    /// Capability-free extraction used for degraded profiles.
    fn heuristic(raw_text: &str) -> Self::Fields;
}

/// A job description.
pub enum JobDescription {}

/// A candidate résumé.
pub enum Resume {}

impl ProfileKind for JobDescription {
    type Fields = JobFields;

    const LABEL: &'static str = "job";
    const PROMPT: &'static str = JOB_EXTRACTION_PROMPT;
    const SCHEMA_HINT: &'static str = JOB_SCHEMA_HINT;

    fn parse(output: &str) -> Result<JobFields, String> {
        parse_job_fields(output)
    }

    fn heuristic(raw_text: &str) -> JobFields {
        heuristics::job_fields(raw_text)
    }
}

impl ProfileKind for Resume {
    type Fields = CandidateFields;

    const LABEL: &'static str = "resume";
    const PROMPT: &'static str = CANDIDATE_EXTRACTION_PROMPT;
    const SCHEMA_HINT: &'static str = CANDIDATE_SCHEMA_HINT;

    fn parse(output: &str) -> Result<CandidateFields, String> {
        parse_candidate_fields(output)
    }

    fn heuristic(raw_text: &str) -> CandidateFields {
        heuristics::candidate_fields(raw_text)
    }
}

/// Extracted fields plus whether they came from the model or the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub fields: T,
    pub quality: ExtractionQuality,
}

impl<T> Extraction<T> {
    fn complete(fields: T) -> Self {
        Self {
            fields,
            quality: ExtractionQuality::Complete,
        }
    }

    fn degraded(fields: T) -> Self {
        Self {
            fields,
            quality: ExtractionQuality::Degraded,
        }
    }
}

pub struct TextExtractor {
    generator: Arc<dyn TextGeneration>,
    config: ExtractionConfig,
    timeout: Duration,
}

impl TextExtractor {
    pub fn new(
        generator: Arc<dyn TextGeneration>,
        config: ExtractionConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            config,
            timeout,
        }
    }

    /// `K` selects the prompt, schema, parser and heuristic fallback.
    pub async fn extract<K: ProfileKind>(&self, raw_text: &str) -> Extraction<K::Fields> {
        if self.is_too_short(raw_text) {
            debug!(
                kind = K::LABEL,
                "Text below minimum length; using heuristic extraction"
            );
            return Extraction::degraded(K::heuristic(raw_text));
        }
        let prompt = K::PROMPT.replace("{raw_text}", raw_text);
        match self.generate_parsed(&prompt, K::SCHEMA_HINT, K::parse).await {
            Some(fields) => Extraction::complete(fields),
            None => {
                warn!(
                    kind = K::LABEL,
                    reason = "extraction_degraded",
                    "Extraction fell back to heuristics"
                );
                Extraction::degraded(K::heuristic(raw_text))
            }
        }
    }

    fn is_too_short(&self, raw_text: &str) -> bool {
        raw_text.trim().chars().count() < self.config.min_text_chars
    }

    /// Calls the model and parses its output. Unusable output earns one retry
    /// with a corrective instruction; a capability failure does not, since the
    /// adapter has already spent its single transport retry.
    async fn generate_parsed<T>(
        &self,
        prompt: &str,
        schema_hint: &str,
        parse: fn(&str) -> Result<T, String>,
    ) -> Option<T> {
        let mut current_prompt = prompt.to_string();

        for attempt in 0..2 {
            let output = match with_timeout(
                self.timeout,
                self.generator.generate(&current_prompt, Some(schema_hint)),
            )
            .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(reason = e.reason(), "Extraction capability call failed: {e}");
                    return None;
                }
            };

            match parse(&output) {
                Ok(fields) => return Some(fields),
                Err(problem) => {
                    warn!(
                        "Extraction attempt {}/2 returned unusable output: {problem}",
                        attempt + 1
                    );
                    current_prompt =
                        CORRECTIVE_INSTRUCTION.replace("{problem}", &problem) + prompt;
                }
            }
        }
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient parsing of model output
// ────────────────────────────────────────────────────────────────────────────

fn parse_object(output: &str) -> Result<serde_json::Map<String, Value>, String> {
    let json = extract_json_object(output).ok_or("no JSON object found")?;
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("top-level value is not an object".to_string()),
        Err(e) => Err(format!("invalid JSON ({e})")),
    }
}

fn parse_job_fields(output: &str) -> Result<JobFields, String> {
    let obj = parse_object(output)?;
    let fields = JobFields {
        summary: required_text(&obj, "summary")?,
        required_skills: normalize_skill_set(required_text_list(&obj, "required_skills")?),
        required_experience: required_text(&obj, "required_experience")?,
        responsibilities: required_text_list(&obj, "responsibilities")?,
    };
    if fields.summary.is_empty()
        && fields.required_skills.is_empty()
        && fields.responsibilities.is_empty()
    {
        return Err("every field is empty".to_string());
    }
    Ok(fields)
}

fn parse_candidate_fields(output: &str) -> Result<CandidateFields, String> {
    let obj = parse_object(output)?;

    let education = required_object_list(&obj, "education")?
        .iter()
        .map(|e| Education {
            institution: lenient_text(e.get("institution")),
            degree: lenient_text(e.get("degree")),
            year: lenient_text(e.get("year")),
        })
        .filter(|e| !(e.institution.is_empty() && e.degree.is_empty()))
        .collect();

    let work_experience = required_object_list(&obj, "work_experience")?
        .iter()
        .map(|w| WorkExperience {
            employer: lenient_text(w.get("employer")),
            title: lenient_text(w.get("title")),
            duration: lenient_text(w.get("duration")),
        })
        .filter(|w| !(w.employer.is_empty() && w.title.is_empty()))
        .collect();

    let fields = CandidateFields {
        education,
        work_experience,
        skills: normalize_skill_set(required_text_list(&obj, "skills")?),
        certifications: normalize_skill_set(required_text_list(&obj, "certifications")?),
    };
    if fields.education.is_empty() && fields.work_experience.is_empty() && fields.skills.is_empty()
    {
        return Err("education, work_experience and skills are all empty".to_string());
    }
    Ok(fields)
}

fn required_text(obj: &serde_json::Map<String, Value>, key: &str) -> Result<String, String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(normalize_whitespace(s)),
        Some(Value::Null) | None => Err(format!("missing field '{key}'")),
        Some(other) => Ok(lenient_text(Some(other))),
    }
}

fn required_text_list(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, String> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|v| lenient_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect()),
        // Models sometimes return "a, b, c" instead of an array.
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty())
            .collect()),
        _ => Err(format!("missing or non-list field '{key}'")),
    }
}

fn required_object_list<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<&'a serde_json::Map<String, Value>>, String> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items.iter().filter_map(Value::as_object).collect()),
        _ => Err(format!("missing or non-list field '{key}'")),
    }
}

/// Scalars become text; anything else becomes empty.
fn lenient_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => normalize_whitespace(s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
