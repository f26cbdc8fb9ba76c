//! Compact text renderings of profiles, used as embedding and prompt input.
//! Field order is fixed so identical profiles always render identically.

use crate::models::profile::{CandidateProfile, JobProfile};

pub fn job_text(job: &JobProfile) -> String {
    let fields = &job.fields;
    let mut lines = vec![
        format!("TITLE: {}", job.title),
        format!("SKILLS: {}", join(fields.required_skills.iter())),
        format!("EXPERIENCE: {}", fields.required_experience),
    ];
    if !fields.summary.is_empty() {
        lines.push(format!("SUMMARY: {}", fields.summary));
    }
    lines.push(format!(
        "RESPONSIBILITIES: {}",
        fields.responsibilities.join("; ")
    ));
    lines.join("\n")
}

pub fn candidate_text(candidate: &CandidateProfile) -> String {
    let fields = &candidate.fields;
    let experience = fields
        .work_experience
        .iter()
        .map(|w| match w.duration.is_empty() {
            true => format!("{} at {}", w.title, w.employer),
            false => format!("{} at {} ({})", w.title, w.employer, w.duration),
        })
        .collect::<Vec<_>>()
        .join("; ");
    let education = fields
        .education
        .iter()
        .map(|e| match e.year.is_empty() {
            true => format!("{}, {}", e.degree, e.institution),
            false => format!("{}, {} ({})", e.degree, e.institution, e.year),
        })
        .collect::<Vec<_>>()
        .join("; ");

    [
        format!("SKILLS: {}", join(fields.skills.iter())),
        format!("EXPERIENCE: {experience}"),
        format!("EDUCATION: {education}"),
        format!("CERTIFICATIONS: {}", join(fields.certifications.iter())),
    ]
    .join("\n")
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::tests_support::{candidate, job};

    #[test]
    fn test_job_text_lists_skills_and_responsibilities() {
        let job = job(&["Python", "SQL"], "3+ years backend");
        let text = job_text(&job);
        assert!(text.contains("SKILLS: Python, SQL"));
        assert!(text.contains("EXPERIENCE: 3+ years backend"));
        assert!(text.contains("RESPONSIBILITIES: Build APIs"));
    }

    #[test]
    fn test_candidate_text_renders_work_history() {
        let candidate = candidate(&["Go", "Python"], &["BSc Computer Science"]);
        let text = candidate_text(&candidate);
        assert!(text.contains("SKILLS: Go, Python"));
        assert!(text.contains("Backend Developer at Paylane (2020-2024)"));
        assert!(text.contains("EDUCATION: BSc Computer Science, Tech University (2019)"));
    }

    #[test]
    fn test_rendering_is_stable() {
        let candidate = candidate(&["Python"], &[]);
        assert_eq!(candidate_text(&candidate), candidate_text(&candidate.clone()));
    }
}
