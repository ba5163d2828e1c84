//! Upload service
//!
//! Accepts images from multipart forms or remote URLs and hands them to the
//! configured object storage, returning the public URL.

use crate::storage::{ObjectStorage, StorageError};
use axum::body::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Upload failures
#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected before any upstream call
    #[error("{0}")]
    Invalid(String),

    /// Remote fetch or storage write failed
    #[error("{0}")]
    Upstream(String),
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        UploadError::Upstream(err.to_string())
    }
}

/// Upload proxy in front of [`ObjectStorage`]
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    http: reqwest::Client,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, http: reqwest::Client, max_bytes: usize) -> Self {
        Self {
            storage,
            http,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an uploaded image under `uploads/{uuid}-{file_name}`
    pub async fn upload_file(
        &self,
        file_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, UploadError> {
        if !content_type.starts_with("image/") {
            return Err(UploadError::Invalid(format!(
                "Only image uploads are allowed, got {content_type}"
            )));
        }
        if body.is_empty() {
            return Err(UploadError::Invalid("Uploaded file is empty".to_string()));
        }
        self.check_size(body.len())?;

        let key = format!("uploads/{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        self.store(&key, content_type, body).await
    }

    /// Fetch a remote file and store it under `uploads/{uuid}-{unix millis}`
    pub async fn upload_from_url(&self, url: &str) -> Result<String, UploadError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| UploadError::Invalid(format!("Invalid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UploadError::Invalid(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let mut response = self
            .http
            .get(url.clone())
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "remote fetch failed");
                UploadError::Upstream(format!("Failed to fetch {url}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "remote fetch returned an error status");
            return Err(UploadError::Upstream(format!(
                "Fetching {url} returned {status}"
            )));
        }

        if let Some(length) = response.content_length() {
            self.check_size(length as usize)?;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| UploadError::Upstream(format!("Failed to read {url}: {e}")))?
        {
            body.extend_from_slice(&chunk);
            self.check_size(body.len())?;
        }

        let key = format!(
            "uploads/{}-{}",
            Uuid::new_v4(),
            chrono::Utc::now().timestamp_millis()
        );
        self.store(&key, &content_type, Bytes::from(body)).await
    }

    fn check_size(&self, len: usize) -> Result<(), UploadError> {
        if len > self.max_bytes {
            return Err(UploadError::Invalid(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        Ok(())
    }

    async fn store(&self, key: &str, content_type: &str, body: Bytes) -> Result<String, UploadError> {
        let size = body.len();
        self.storage
            .put_object(key, content_type, body)
            .await
            .map_err(|e| {
                error!(key, error = %e, "storage write failed");
                UploadError::from(e)
            })?;

        debug!(key, size, content_type, "upload stored");
        Ok(self.storage.public_url(key))
    }
}

/// Keep only the final path segment of a client-supplied file name
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or_default().trim();
    if base.is_empty() {
        "file".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn service(max_bytes: usize) -> (UploadService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new("http://localhost:3001/files"));
        let service = UploadService::new(storage.clone(), reqwest::Client::new(), max_bytes);
        (service, storage)
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\img\\cat.jpg"), "cat.jpg");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[tokio::test]
    async fn test_upload_file_stores_under_uploads_prefix() {
        let (service, storage) = service(1024);
        let url = service
            .upload_file("cat.png", "image/png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:3001/files/uploads/"));
        assert!(url.ends_with("-cat.png"));

        let key = url.trim_start_matches("http://localhost:3001/files/");
        let stored = storage.get(key).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_file_rejects_non_images() {
        let (service, storage) = service(1024);
        let result = service
            .upload_file("notes.txt", "text/plain", Bytes::from_static(b"hi"))
            .await;
        assert!(matches!(result, Err(UploadError::Invalid(_))));
        assert_eq!(storage.len().await, 0);
    }

    #[tokio::test]
    async fn test_upload_file_enforces_size_limit() {
        let (service, _) = service(4);
        let result = service
            .upload_file("big.png", "image/png", Bytes::from_static(b"12345"))
            .await;
        assert!(matches!(result, Err(UploadError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_upload_from_url_rejects_bad_urls() {
        let (service, _) = service(1024);
        assert!(matches!(
            service.upload_from_url("not a url").await,
            Err(UploadError::Invalid(_))
        ));
        assert!(matches!(
            service.upload_from_url("ftp://example.com/a.png").await,
            Err(UploadError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_from_unreachable_host_is_upstream_error() {
        let (service, _) = service(1024);
        // port 1 on loopback refuses connections
        let result = service.upload_from_url("http://127.0.0.1:1/a.png").await;
        assert!(matches!(result, Err(UploadError::Upstream(_))));
    }
}
