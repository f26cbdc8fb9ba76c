use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Where original résumé uploads are archived.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores the uploaded file and returns its object key.
    async fn put_resume(
        &self,
        candidate_id: Uuid,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, AppError>;

    async fn delete_resume(&self, key: &str) -> Result<(), AppError>;
}

/// Archive of original résumé uploads in S3.
#[derive(Clone)]
pub struct ResumeArchive {
    client: S3Client,
    bucket: String,
}

impl ResumeArchive {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ResumeStore for ResumeArchive {
    async fn put_resume(
        &self,
        candidate_id: Uuid,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, AppError> {
        let key = resume_key(candidate_id, filename);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Archived resume to s3://{}/{}", self.bucket, key);
        Ok(key)
    }

    async fn delete_resume(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        info!("Removed s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// `resumes/<candidate_id>/<filename>`, with the filename reduced to a safe
/// character set.
pub fn resume_key(candidate_id: Uuid, filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_start_matches('.');
    let safe = if safe.is_empty() { "resume" } else { safe };
    format!("resumes/{candidate_id}/{safe}")
}
