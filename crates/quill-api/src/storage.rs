//! Object storage adapters
//!
//! Uploads go to an S3-compatible bucket (Cloudflare R2 in production) via a
//! single SigV4-signed `PUT`. The in-memory adapter backs tests and local runs.

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use quill_core::config::StorageConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Destination for uploaded files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under `key`
    async fn put_object(&self, key: &str, content_type: &str, body: Bytes)
        -> Result<(), StorageError>;

    /// Public URL an object is served from
    fn public_url(&self, key: &str) -> String;
}

/// Percent-encode per SigV4 rules (unreserved characters pass through)
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>, StorageError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive the SigV4 signing key for a date, region and service
fn signing_key(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, StorageError> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date_stamp)?;
    let k_region = hmac_sha256(&k_date, region)?;
    let k_service = hmac_sha256(&k_region, service)?;
    hmac_sha256(&k_service, "aws4_request")
}

/// S3-compatible storage using path-style addressing
pub struct S3Storage {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    bucket: String,
    access_key: String,
    secret_key: String,
    region: String,
    public_domain: String,
}

impl S3Storage {
    pub fn new(client: reqwest::Client, config: &StorageConfig) -> Result<Self, StorageError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| StorageError::InvalidEndpoint("endpoint not configured".to_string()))?;
        let endpoint = reqwest::Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| StorageError::InvalidEndpoint(e.to_string()))?;
        if endpoint.host_str().is_none() {
            return Err(StorageError::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self {
            client,
            endpoint,
            bucket: config.bucket.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            region: config.region.clone(),
            public_domain: config.public_domain.trim_end_matches('/').to_string(),
        })
    }

    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn canonical_uri(&self, key: &str) -> String {
        format!(
            "/{}/{}",
            uri_encode(&self.bucket, true),
            uri_encode(key, false)
        )
    }

    /// `Authorization` header for a `PUT` of the given payload
    fn authorization(
        &self,
        key: &str,
        content_type: &str,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();

        let signed_headers = "content-type;host;x-amz-content-sha256;x-amz-date";
        let canonical_headers = format!(
            "content-type:{content_type}\nhost:{}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n",
            self.host()
        );
        let canonical_request = format!(
            "PUT\n{}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            self.canonical_uri(key)
        );

        let scope = format!("{date_stamp}/{}/s3/aws4_request", self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(&self.secret_key, &date_stamp, &self.region, "s3")?;
        let signature = hex::encode(hmac_sha256(&key, &string_to_sign)?);

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key
        ))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let payload_hash = hex::encode(Sha256::digest(&body));
        let authorization = self.authorization(key, content_type, &payload_hash, now)?;

        let mut url = self.endpoint.clone();
        url.set_path(&self.canonical_uri(key));

        let response = self
            .client
            .put(url)
            .header("content-type", content_type)
            .header("x-amz-content-sha256", &payload_hash)
            .header("x-amz-date", now.format("%Y%m%dT%H%M%SZ").to_string())
            .header("authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(key, "object stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_domain, uri_encode(key, false))
    }
}

/// Stored object held by [`MemoryStorage`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Bytes,
}

/// In-memory object storage
pub struct MemoryStorage {
    public_domain: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(public_domain: impl Into<String>) -> Self {
        Self {
            public_domain: public_domain.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), StorageError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_domain, uri_encode(key, false))
    }
}
