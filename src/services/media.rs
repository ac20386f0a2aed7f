//! Media store — external upload collaborator for image messages.
//!
//! DESIGN
//! ======
//! Image payloads arrive from clients as base64 data URLs. Before a message
//! is persisted, the payload must be exchanged for a durable URL through the
//! media store; delivery blocks on that upload (no send-then-backfill).
//! The trait keeps the collaborator mockable — tests never hit the network.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The media store is not configured; image messages cannot be accepted.
    #[error("media store not configured")]
    NotConfigured,

    /// The upload request failed in transit.
    #[error("media upload failed: {0}")]
    Upload(String),

    /// The media store answered with a non-success status.
    #[error("media store error: status {status}")]
    Response { status: u16, body: String },
}

/// Uploads a raw image payload and returns a durable URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, data_url: &str) -> Result<String, MediaError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Media store backed by an HTTP upload endpoint.
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl HttpMediaStore {
    /// Build a media client from `MEDIA_UPLOAD_URL`.
    /// Returns `None` if the variable is missing (media disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let upload_url = std::env::var("MEDIA_UPLOAD_URL").ok()?;
        Some(Self { client: reqwest::Client::new(), upload_url })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, data_url: &str) -> Result<String, MediaError> {
        let resp = self
            .client
            .post(&self.upload_url)
            .json(&serde_json::json!({ "file": data_url }))
            .send()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MediaError::Response { status, body });
        }

        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;
        Ok(parsed.secure_url)
    }
}
