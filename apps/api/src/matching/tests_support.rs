//! Profile builders shared by the matching tests.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::models::profile::{
    normalize_skill_set, CandidateFields, CandidateProfile, Contact, Education,
    ExtractionQuality, JobFields, JobProfile, WorkExperience,
};

pub fn job(required_skills: &[&str], required_experience: &str) -> JobProfile {
    JobProfile {
        id: Uuid::new_v4(),
        title: "Backend Engineer".to_string(),
        company: "Acme".to_string(),
        raw_description: format!("Backend Engineer at Acme. {required_experience}"),
        fields: JobFields {
            summary: "Build payment APIs.".to_string(),
            required_skills: normalize_skill_set(required_skills),
            required_experience: required_experience.to_string(),
            responsibilities: vec!["Build APIs".to_string()],
        },
        extraction_quality: ExtractionQuality::Complete,
        created_at: Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap(),
    }
}

pub fn candidate(skills: &[&str], degrees: &[&str]) -> CandidateProfile {
    CandidateProfile {
        id: Uuid::new_v4(),
        name: "Jordan Lee".to_string(),
        contact: Contact {
            email: "jordan@example.com".to_string(),
            phone: None,
        },
        raw_resume: "Backend Developer at Paylane (2020-2024)".to_string(),
        resume_key: None,
        fields: CandidateFields {
            education: degrees
                .iter()
                .map(|d| Education {
                    institution: "Tech University".to_string(),
                    degree: (*d).to_string(),
                    year: "2019".to_string(),
                })
                .collect(),
            work_experience: vec![WorkExperience {
                employer: "Paylane".to_string(),
                title: "Backend Developer".to_string(),
                duration: "2020-2024".to_string(),
            }],
            skills: normalize_skill_set(skills),
            certifications: Default::default(),
        },
        extraction_quality: ExtractionQuality::Complete,
        created_at: Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap(),
    }
}
