//! Pure heuristic extraction used when the model is skipped, down, or keeps
//! returning unusable output. Deterministic: same text, same fields.

use std::collections::BTreeSet;

use crate::matching::education::degree_level;
use crate::models::matching::DegreeLevel;
use crate::models::profile::{
    normalize_skill_set, normalize_whitespace, CandidateFields, Education, JobFields,
    WorkExperience,
};

const MAX_SUMMARY_CHARS: usize = 280;
const MAX_RESPONSIBILITIES: usize = 10;

/// Common technical terms recognized anywhere in the text.
/// Single-letter and ambiguous English words ("Go", "R", "C") are left out on purpose.
const SKILL_VOCABULARY: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "Rust", "Golang", "C++", "C#", "Ruby",
    "PHP", "Scala", "Kotlin", "Swift", "SQL", "PostgreSQL", "MySQL", "SQLite", "MongoDB",
    "Redis", "Kafka", "RabbitMQ", "Elasticsearch", "Spark", "Hadoop", "Airflow", "dbt",
    "Docker", "Kubernetes", "Terraform", "Ansible", "AWS", "Azure", "GCP", "Linux",
    "Git", "CI/CD", "React", "Angular", "Vue", "Node.js", "Django", "Flask", "FastAPI",
    "Spring Boot", "GraphQL", "REST", "gRPC", "HTML", "CSS", "Pandas", "NumPy",
    "TensorFlow", "PyTorch", "scikit-learn", "Machine Learning", "Deep Learning",
    "Data Analysis", "Statistics", "Tableau", "Power BI", "Excel", "Agile", "Scrum",
    "Microservices", "Distributed Systems",
];

const SKILL_HEADERS: &[&str] = &[
    "skills",
    "technical skills",
    "requirements",
    "required",
    "qualifications",
    "tech stack",
    "technologies",
];

const RESPONSIBILITY_HEADERS: &[&str] = &["responsibilities", "you will", "duties", "what you'll do"];

/// Best-effort job fields from raw description text.
pub fn job_fields(raw_text: &str) -> JobFields {
    let lines = content_lines(raw_text);

    let summary = lines
        .iter()
        .find(|l| !is_bullet(l) && header_items(l, SKILL_HEADERS).is_none())
        .map(|l| truncate(l, MAX_SUMMARY_CHARS))
        .unwrap_or_default();

    let required_experience = lines
        .iter()
        .find(|l| mentions_years(l))
        .map(|l| strip_bullet(l).to_string())
        .unwrap_or_default();

    let mut in_responsibilities = false;
    let mut responsibilities = Vec::new();
    for line in &lines {
        let lower = line.to_lowercase();
        if RESPONSIBILITY_HEADERS.iter().any(|h| lower.starts_with(h)) {
            in_responsibilities = true;
            if let Some((_, rest)) = line.split_once(':') {
                responsibilities.extend(split_items(rest));
            }
            continue;
        }
        if header_items(line, SKILL_HEADERS).is_some() {
            in_responsibilities = false;
            continue;
        }
        if is_bullet(line) && (in_responsibilities || !mentions_years(line)) {
            responsibilities.push(strip_bullet(line).to_string());
        }
    }
    responsibilities.truncate(MAX_RESPONSIBILITIES);

    JobFields {
        summary,
        required_skills: collect_skills(raw_text, &lines),
        required_experience,
        responsibilities,
    }
}

/// Best-effort candidate fields from raw résumé text.
pub fn candidate_fields(raw_text: &str) -> CandidateFields {
    let lines = content_lines(raw_text);

    let education = lines
        .iter()
        .filter(|l| degree_level(l) > DegreeLevel::None)
        .map(|l| parse_education(strip_bullet(l)))
        .collect();

    let work_experience = lines
        .iter()
        .filter(|l| degree_level(l) == DegreeLevel::None)
        .filter_map(|l| parse_work_line(strip_bullet(l)))
        .collect();

    let certifications = normalize_skill_set(
        lines
            .iter()
            .map(|l| strip_bullet(l))
            .filter(|l| {
                let lower = l.to_lowercase();
                lower.contains("certified") || lower.contains("certification")
            })
            .flat_map(|l| match l.split_once(':') {
                Some((_, rest)) => split_items(rest),
                None => vec![l.to_string()],
            }),
    );

    CandidateFields {
        education,
        work_experience,
        skills: collect_skills(raw_text, &lines),
        certifications,
    }
}

/// Explicitly listed skills ("Skills: a, b, c") plus vocabulary hits.
fn collect_skills(raw_text: &str, lines: &[String]) -> BTreeSet<String> {
    let mut found: Vec<String> = lines
        .iter()
        .filter_map(|l| header_items(l, SKILL_HEADERS))
        .flatten()
        .filter(|item| item.split_whitespace().count() <= 4)
        .collect();

    let haystack = token_string(raw_text);
    for term in SKILL_VOCABULARY {
        if haystack.contains(&token_string(term)) {
            found.push((*term).to_string());
        }
    }
    normalize_skill_set(found)
}

/// "Header: a, b; c" → items, when the line starts with one of `headers`.
fn header_items(line: &str, headers: &[&str]) -> Option<Vec<String>> {
    let (head, rest) = strip_bullet(line).split_once(':')?;
    let head = head.trim().to_lowercase();
    headers
        .iter()
        .any(|h| head == *h || head.ends_with(h))
        .then(|| split_items(rest))
}

fn split_items(text: &str) -> Vec<String> {
    text.split([',', ';', '|', '•'])
        .map(|s| normalize_whitespace(s.trim_end_matches('.')))
        .filter(|s| !s.is_empty())
        .collect()
}

/// "Senior Engineer at Acme Corp (2019-2023)" → WorkExperience.
fn parse_work_line(line: &str) -> Option<WorkExperience> {
    let (title, rest) = line.split_once(" at ")?;
    let years = years_in(line);
    if years.is_empty() && !line.to_lowercase().contains("present") {
        return None;
    }
    let employer = rest
        .split(['(', ',', '|'])
        .next()
        .map(normalize_whitespace)
        .unwrap_or_default();
    let duration = match line.find('(').zip(line.rfind(')')) {
        Some((open, close)) if close > open => normalize_whitespace(&line[open + 1..close]),
        _ => years.join("-"),
    };
    Some(WorkExperience {
        employer,
        title: normalize_whitespace(title),
        duration,
    })
}

/// "BSc Computer Science, State University, 2018" → Education.
fn parse_education(line: &str) -> Education {
    const INSTITUTION_WORDS: &[&str] = &["university", "college", "institute", "school", "academy"];
    let parts: Vec<String> = line
        .split([',', '|', '-'])
        .map(normalize_whitespace)
        .filter(|p| !p.is_empty())
        .collect();
    let institution = parts
        .iter()
        .find(|p| {
            let lower = p.to_lowercase();
            INSTITUTION_WORDS.iter().any(|w| lower.contains(w))
        })
        .cloned()
        .unwrap_or_default();
    let degree = parts
        .iter()
        .find(|p| degree_level(p) > DegreeLevel::None)
        .cloned()
        .unwrap_or_else(|| normalize_whitespace(line));
    Education {
        institution,
        degree,
        year: years_in(line).last().cloned().unwrap_or_default(),
    }
}

/// Four-digit years between 1950 and 2099, in order of appearance.
fn years_in(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|t| t.len() == 4)
        .filter(|t| matches!(t.parse::<u32>(), Ok(y) if (1950..2100).contains(&y)))
        .map(String::from)
        .collect()
}

fn mentions_years(line: &str) -> bool {
    let lower = line.to_lowercase();
    (lower.contains("year") || lower.contains("yrs")) && lower.chars().any(|c| c.is_ascii_digit())
}

fn content_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_whitespace)
        .filter(|l| !l.is_empty())
        .collect()
}

fn is_bullet(line: &str) -> bool {
    line.starts_with(['-', '*', '•'])
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '*', '•']).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Lowercased tokens separated by single spaces and padded, so that
/// `" sql "` matches the term but not "mysql".
pub fn token_string(text: &str) -> String {
    let tokens: Vec<String> = text
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '/' | '-')))
        .map(|t| t.trim_end_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    format!(" {} ", tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_TEXT: &str = "Senior Data Engineer building our analytics platform.\n\
        Requirements: Python, SQL, Airflow\n\
        5+ years of data engineering experience\n\
        Responsibilities:\n\
        - Build batch pipelines\n\
        - Own the warehouse schema\n";

    const RESUME_TEXT: &str = "Jane Doe\n\
        Software Engineer at Acme Corp (2019-2023)\n\
        Data Analyst at Beta LLC, 2016-2019\n\
        BSc Computer Science, State University, 2016\n\
        Skills: Python, Docker, Kubernetes\n\
        AWS Certified Developer\n";

    #[test]
    fn test_job_fields_extracts_listed_skills() {
        let fields = job_fields(JOB_TEXT);
        assert!(fields.required_skills.contains("Python"));
        assert!(fields.required_skills.contains("SQL"));
        assert!(fields.required_skills.contains("Airflow"));
    }

    #[test]
    fn test_job_fields_summary_and_experience() {
        let fields = job_fields(JOB_TEXT);
        assert_eq!(
            fields.summary,
            "Senior Data Engineer building our analytics platform."
        );
        assert_eq!(
            fields.required_experience,
            "5+ years of data engineering experience"
        );
    }

    #[test]
    fn test_job_fields_collects_responsibility_bullets() {
        let fields = job_fields(JOB_TEXT);
        assert_eq!(
            fields.responsibilities,
            vec!["Build batch pipelines", "Own the warehouse schema"]
        );
    }

    #[test]
    fn test_candidate_fields_work_experience() {
        let fields = candidate_fields(RESUME_TEXT);
        assert_eq!(fields.work_experience.len(), 2);
        assert_eq!(fields.work_experience[0].title, "Software Engineer");
        assert_eq!(fields.work_experience[0].employer, "Acme Corp");
        assert_eq!(fields.work_experience[0].duration, "2019-2023");
        assert_eq!(fields.work_experience[1].employer, "Beta LLC");
    }

    #[test]
    fn test_candidate_fields_education() {
        let fields = candidate_fields(RESUME_TEXT);
        assert_eq!(fields.education.len(), 1);
        assert_eq!(fields.education[0].degree, "BSc Computer Science");
        assert_eq!(fields.education[0].institution, "State University");
        assert_eq!(fields.education[0].year, "2016");
    }

    #[test]
    fn test_candidate_fields_skills_and_certifications() {
        let fields = candidate_fields(RESUME_TEXT);
        assert!(fields.skills.contains("Docker"));
        assert!(fields.skills.contains("Kubernetes"));
        assert!(fields.certifications.contains("AWS Certified Developer"));
    }

    #[test]
    fn test_vocabulary_match_respects_token_boundaries() {
        let fields = job_fields("We use MySQL heavily in production systems every day.");
        assert!(fields.required_skills.contains("MySQL"));
        assert!(!fields.required_skills.contains("SQL"));
    }

    #[test]
    fn test_empty_text_yields_empty_fields() {
        assert_eq!(job_fields(""), JobFields::default());
        assert_eq!(candidate_fields("   "), CandidateFields::default());
    }

    #[test]
    fn test_heuristics_are_deterministic() {
        assert_eq!(candidate_fields(RESUME_TEXT), candidate_fields(RESUME_TEXT));
    }
}
