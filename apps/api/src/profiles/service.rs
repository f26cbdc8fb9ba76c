//! createJob / createCandidate: validate → extract → store.
//! Extraction never blocks creation; a model outage only marks the profile
//! `Degraded`.

use std::future::Future;

use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{JobDescription, Resume, TextExtractor};
use crate::models::profile::{normalize_whitespace, CandidateProfile, Contact, JobProfile};
use crate::profiles::repository;
use crate::storage::ResumeStore;

#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub resume_text: String,
}

pub async fn create_job(
    pool: &PgPool,
    extractor: &TextExtractor,
    request: NewJob,
) -> Result<JobProfile, AppError> {
    let job = build_job(extractor, request).await?;
    repository::insert_job(pool, &job).await?;
    Ok(job)
}

pub async fn create_candidate(
    pool: &PgPool,
    extractor: &TextExtractor,
    request: NewCandidate,
) -> Result<CandidateProfile, AppError> {
    let candidate = build_candidate(extractor, request).await?;
    repository::insert_candidate(pool, &candidate).await?;
    Ok(candidate)
}

/// Creates a candidate from an uploaded file. The file is archived only once
/// the profile has validated and its email is free, and is removed again if
/// the insert still fails.
pub async fn create_uploaded_candidate(
    pool: &PgPool,
    archive: &dyn ResumeStore,
    extractor: &TextExtractor,
    request: NewCandidate,
    filename: &str,
    file: Bytes,
) -> Result<CandidateProfile, AppError> {
    let candidate = build_candidate(extractor, request).await?;
    if repository::candidate_email_exists(pool, &candidate.contact.email).await? {
        return Err(repository::duplicate_email(&candidate.contact.email));
    }
    archive_and_store(archive, candidate, filename, file, |c| async move {
        repository::insert_candidate(pool, &c).await?;
        Ok::<_, AppError>(c)
    })
    .await
}

/// Archives the file, records its key on the candidate, then persists.
/// A persist failure deletes the archived object and returns the persist error.
async fn archive_and_store<F, Fut>(
    archive: &dyn ResumeStore,
    mut candidate: CandidateProfile,
    filename: &str,
    file: Bytes,
    persist: F,
) -> Result<CandidateProfile, AppError>
where
    F: FnOnce(CandidateProfile) -> Fut,
    Fut: Future<Output = Result<CandidateProfile, AppError>>,
{
    let key = archive
        .put_resume(candidate.id, filename, content_type_for(filename), file)
        .await?;
    candidate.resume_key = Some(key.clone());

    match persist(candidate).await {
        Ok(stored) => Ok(stored),
        Err(e) => {
            if let Err(cleanup) = archive.delete_resume(&key).await {
                warn!("Orphaned resume {key} after failed insert: {cleanup}");
            }
            Err(e)
        }
    }
}

pub async fn build_job(extractor: &TextExtractor, request: NewJob) -> Result<JobProfile, AppError> {
    let title = required("title", &request.title)?;
    let description = request.description.trim();
    if description.is_empty() {
        return Err(AppError::InvalidInput("description cannot be empty".to_string()));
    }

    let extraction = extractor.extract::<JobDescription>(description).await;
    Ok(JobProfile {
        id: Uuid::new_v4(),
        title,
        company: normalize_whitespace(&request.company),
        raw_description: description.to_string(),
        fields: extraction.fields,
        extraction_quality: extraction.quality,
        created_at: Utc::now(),
    })
}

pub async fn build_candidate(
    extractor: &TextExtractor,
    request: NewCandidate,
) -> Result<CandidateProfile, AppError> {
    let name = required("name", &request.name)?;
    let contact = validate_contact(&request)?;
    let resume = request.resume_text.trim();
    if resume.is_empty() {
        return Err(AppError::InvalidInput("resume text cannot be empty".to_string()));
    }

    let extraction = extractor.extract::<Resume>(resume).await;
    Ok(CandidateProfile {
        id: Uuid::new_v4(),
        name,
        contact,
        raw_resume: resume.to_string(),
        resume_key: None,
        fields: extraction.fields,
        extraction_quality: extraction.quality,
        created_at: Utc::now(),
    })
}

fn validate_contact(request: &NewCandidate) -> Result<Contact, AppError> {
    let email = request.email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    };
    if !valid {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a valid email address",
            request.email.trim()
        )));
    }
    let phone = request
        .phone
        .as_deref()
        .map(normalize_whitespace)
        .filter(|p| !p.is_empty());
    Ok(Contact { email, phone })
}

/// Plain text of an uploaded résumé file. `.txt` and `.pdf` only.
/// Parsing runs on the blocking pool; a parser panic means the file is unreadable.
pub async fn decode_resume(filename: &str, bytes: Bytes) -> Result<String, AppError> {
    let name = filename.to_string();
    tokio::task::spawn_blocking(move || decode_resume_blocking(&name, &bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::InvalidInput(format!("Could not read {filename}"))
            } else {
                AppError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in resume decoding: {e}"
                ))
            }
        })?
}

fn decode_resume_blocking(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let lower = filename.to_lowercase();
    let text = if lower.ends_with(".pdf") {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::InvalidInput(format!("Could not read PDF: {e}")))?
    } else if lower.ends_with(".txt") {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::InvalidInput("Text resume must be UTF-8".to_string()))?
    } else {
        return Err(AppError::InvalidInput(
            "Only .txt and .pdf resumes are supported".to_string(),
        ));
    };
    Ok(text)
}

pub fn content_type_for(filename: &str) -> &'static str {
    if filename.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/plain; charset=utf-8"
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = normalize_whitespace(value);
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(value)
}
