// Prompt constants for match scoring and explanation.

/// Compatibility rating used when embeddings are unavailable.
/// Replace `{job}` and `{candidate}` before sending.
pub const RATING_PROMPT: &str = r#"You are an experienced technical recruiter.
Rate how well the candidate fits the job on a scale from 0 (no fit) to 100 (perfect fit).

Consider required skills first, then relevant experience, then education.
Base the rating ONLY on the two profiles below.

JOB:
{job}

CANDIDATE:
{candidate}"#;

pub const RATING_SCHEMA_HINT: &str = r#"{"rating": 72}"#;

/// Experience assessment plus a short recruiter-facing explanation.
/// Replace `{job}`, `{candidate}`, `{required_experience}`, `{score}`,
/// `{matched}` and `{gaps}` before sending.
pub const ASSESSMENT_PROMPT: &str = r#"You are an experienced technical recruiter.
Compare the candidate's work history with the job's experience requirement and
explain the match to a hiring manager.

Rules:
- experience_verdict: exactly one of "meets", "below", "exceeds".
- experience_rationale: one sentence citing the candidate's actual roles.
- explanation: two or three sentences. Name at least one matched skill and at least one missing skill when both lists are non-empty.
- Do NOT invent skills or roles that are not in the profiles.

EXPERIENCE REQUIREMENT:
{required_experience}

MATCH SCORE: {score}%
MATCHED SKILLS: {matched}
MISSING SKILLS: {gaps}

JOB:
{job}

CANDIDATE:
{candidate}"#;

pub const ASSESSMENT_SCHEMA_HINT: &str = r#"{
  "experience_verdict": "meets",
  "experience_rationale": "Four years as a backend developer covers the 3+ year requirement.",
  "explanation": "Strong backend fit with Python and PostgreSQL; lacks Kafka experience."
}"#;
