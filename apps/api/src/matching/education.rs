//! Rule-based education comparison. No model involvement, so the same pair of
//! profiles always yields the same `EducationMatch`.

use std::collections::BTreeSet;

use crate::models::matching::{DegreeLevel, EducationMatch, Verdict};
use crate::models::profile::{CandidateProfile, JobProfile};

/// Highest degree level mentioned in `text`, `DegreeLevel::None` if none.
pub fn degree_level(text: &str) -> DegreeLevel {
    degree_levels(text)
        .into_iter()
        .next_back()
        .unwrap_or(DegreeLevel::None)
}

/// Every degree level mentioned in `text`.
fn degree_levels(text: &str) -> BTreeSet<DegreeLevel> {
    let tokens = degree_tokens(text);
    let mut levels = BTreeSet::new();

    for (i, token) in tokens.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| tokens[p].as_str());
        let next = tokens.get(i + 1).map(String::as_str);
        let level = match token.as_str() {
            "phd" | "ph.d" | "doctorate" | "doctoral" | "dphil" | "d.phil" => {
                Some(DegreeLevel::Doctorate)
            }
            // "Scrum Master" is a role, not a degree.
            "master" if previous == Some("scrum") => None,
            "master" | "masters" | "msc" | "m.sc" | "mba" | "meng" | "m.eng" | "m.s" | "m.a"
            | "mphil" => Some(DegreeLevel::Master),
            "bachelor" | "bachelors" | "bsc" | "b.sc" | "b.s" | "b.a" | "beng" | "b.eng"
            | "btech" | "b.tech" | "undergraduate" => Some(DegreeLevel::Bachelor),
            "associates" => Some(DegreeLevel::Associate),
            "associate" if next == Some("degree") => Some(DegreeLevel::Associate),
            _ => None,
        };
        levels.extend(level);
    }
    levels
}

/// Lowercased tokens with possessive "'s" and trailing dots removed.
fn degree_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '\'' | '’')))
        .map(|t| {
            let t = t.to_lowercase();
            let t = t.trim_end_matches('.');
            t.strip_suffix("'s")
                .or_else(|| t.strip_suffix("’s"))
                .unwrap_or(t)
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Minimum degree level the job asks for, if any. A bare mention of
/// "degree" without a level is read as a bachelor's requirement.
pub fn required_degree_level(job: &JobProfile) -> Option<DegreeLevel> {
    let text = format!(
        "{}\n{}\n{}\n{}",
        job.raw_description,
        job.fields.required_experience,
        job.fields.summary,
        job.fields.responsibilities.join("\n")
    );
    if let Some(lowest) = degree_levels(&text).into_iter().next() {
        return Some(lowest);
    }
    degree_tokens(&text)
        .iter()
        .any(|t| t == "degree")
        .then_some(DegreeLevel::Bachelor)
}

pub fn highest_degree_level(candidate: &CandidateProfile) -> DegreeLevel {
    candidate
        .fields
        .education
        .iter()
        .map(|e| degree_level(&e.degree))
        .max()
        .unwrap_or(DegreeLevel::None)
}

pub fn education_match(job: &JobProfile, candidate: &CandidateProfile) -> EducationMatch {
    let required_level = required_degree_level(job);
    let highest_level = highest_degree_level(candidate);

    let (verdict, rationale) = match required_level {
        None => (
            Verdict::Meets,
            format!(
                "No degree requirement stated; candidate's highest degree: {}.",
                level_name(highest_level)
            ),
        ),
        Some(required) if highest_level > required => (
            Verdict::Exceeds,
            format!(
                "Candidate holds a {} degree, above the required {}.",
                level_name(highest_level),
                level_name(required)
            ),
        ),
        Some(required) if highest_level == required => (
            Verdict::Meets,
            format!("Candidate holds the required {} degree.", level_name(required)),
        ),
        Some(required) => (
            Verdict::Below,
            format!(
                "Job requires a {} degree; candidate's highest degree: {}.",
                level_name(required),
                level_name(highest_level)
            ),
        ),
    };

    EducationMatch {
        verdict,
        rationale,
        required_level,
        highest_level,
    }
}

fn level_name(level: DegreeLevel) -> &'static str {
    match level {
        DegreeLevel::None => "none",
        DegreeLevel::Associate => "associate",
        DegreeLevel::Bachelor => "bachelor's",
        DegreeLevel::Master => "master's",
        DegreeLevel::Doctorate => "doctoral",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::tests_support::{candidate, job};

    #[test]
    fn test_degree_level_recognizes_common_spellings() {
        assert_eq!(degree_level("B.Sc. in Physics"), DegreeLevel::Bachelor);
        assert_eq!(degree_level("Master's in Data Science"), DegreeLevel::Master);
        assert_eq!(degree_level("Ph.D. Chemistry"), DegreeLevel::Doctorate);
        assert_eq!(degree_level("Associate degree in IT"), DegreeLevel::Associate);
        assert_eq!(degree_level("Associate Engineer"), DegreeLevel::None);
        assert_eq!(degree_level("Certified Scrum Master"), DegreeLevel::None);
    }

    #[test]
    fn test_required_level_is_lowest_mentioned() {
        let job = job(
            &["Python"],
            "Bachelor's degree required, Master's preferred",
        );
        assert_eq!(required_degree_level(&job), Some(DegreeLevel::Bachelor));
    }

    #[test]
    fn test_bare_degree_mention_reads_as_bachelor() {
        let job = job(&["Python"], "Degree in Computer Science");
        assert_eq!(required_degree_level(&job), Some(DegreeLevel::Bachelor));
    }

    #[test]
    fn test_no_requirement_meets() {
        let result = education_match(&job(&["Python"], "3 years"), &candidate(&[], &[]));
        assert_eq!(result.verdict, Verdict::Meets);
        assert_eq!(result.required_level, None);
        assert_eq!(result.highest_level, DegreeLevel::None);
    }

    #[test]
    fn test_higher_degree_exceeds() {
        let result = education_match(
            &job(&["Python"], "Bachelor's degree"),
            &candidate(&[], &["MSc Computer Science", "BSc Mathematics"]),
        );
        assert_eq!(result.verdict, Verdict::Exceeds);
        assert_eq!(result.highest_level, DegreeLevel::Master);
    }

    #[test]
    fn test_missing_degree_is_below() {
        let result = education_match(
            &job(&["Python"], "Master's degree required"),
            &candidate(&[], &["BSc Mathematics"]),
        );
        assert_eq!(result.verdict, Verdict::Below);
        assert!(result.rationale.contains("master's"));
    }
}
