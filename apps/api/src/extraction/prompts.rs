// Prompt constants for profile extraction.

/// Job extraction prompt. Replace `{raw_text}` before sending.
pub const JOB_EXTRACTION_PROMPT: &str = r#"You are a professional job description analyzer.
Extract the key information from the job description below.

Rules:
- summary: two or three sentences describing the position.
- required_skills: concrete skills, tools, languages or frameworks the role REQUIRES. One skill per entry, no sentences.
- required_experience: the required years and type of experience, verbatim where possible. Empty string if not stated.
- responsibilities: key duties, one per entry, in the order they appear.
- Do NOT invent anything that is not in the text.

JOB DESCRIPTION:
{raw_text}"#;

pub const JOB_SCHEMA_HINT: &str = r#"{
  "summary": "Backend engineer owning the payments API.",
  "required_skills": ["Python", "PostgreSQL"],
  "required_experience": "5+ years of backend development",
  "responsibilities": ["Design and maintain REST services"]
}"#;

/// Candidate extraction prompt. Replace `{raw_text}` before sending.
pub const CANDIDATE_EXTRACTION_PROMPT: &str = r#"You are a professional CV/resume analyzer.
Extract the key information from the resume below.

Rules:
- education: one entry per degree with institution, degree (including field), and graduation year as text.
- work_experience: one entry per position with employer, title, and duration (e.g. "2019-2023" or "3 years"), most recent first.
- skills: concrete skills, tools, languages or frameworks. One skill per entry.
- certifications: named professional certifications only.
- Use an empty array when a section is absent. Do NOT invent anything that is not in the text.

RESUME:
{raw_text}"#;

pub const CANDIDATE_SCHEMA_HINT: &str = r#"{
  "education": [{"institution": "State University", "degree": "BSc Computer Science", "year": "2018"}],
  "work_experience": [{"employer": "Acme Corp", "title": "Software Engineer", "duration": "2019-2023"}],
  "skills": ["Python", "Docker"],
  "certifications": ["AWS Certified Developer"]
}"#;

/// Prepended to the prompt on the single retry after unusable output.
/// Replace `{problem}` before sending.
pub const CORRECTIVE_INSTRUCTION: &str = "Your previous answer could not be used: {problem}. \
    Answer again with ONLY the JSON object, every field present, using the exact field names shown.\n\n";
