//! HTTP upload client adapter
//!
//! Posts one segment per request as JSON with the audio base64-encoded.
//! The endpoint replies `{"success": true, "url": ...}` or
//! `{"success": false, "reason": ...}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{UploadClient, UploadError, UploadReceipt};
use crate::domain::recording::AudioPayload;

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    task_id: &'a str,
    position: usize,
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Upload client over HTTP
pub struct HttpUploadClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpUploadClient {
    /// Create a client for the given upload endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(
        payload: &'a AudioPayload,
        task_id: &'a str,
        position: usize,
    ) -> UploadRequest<'a> {
        UploadRequest {
            task_id,
            position,
            mime_type: payload.mime_type().as_str(),
            data: payload.to_base64(),
        }
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(
        &self,
        payload: &AudioPayload,
        task_id: &str,
        position: usize,
    ) -> Result<UploadReceipt, UploadError> {
        let body = Self::build_request(payload, task_id, position);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(UploadError::Rejected(
                "Storage credentials were not accepted".to_string(),
            ));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UploadError::Rejected(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let response: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Parse(e.to_string()))?;

        if !response.success {
            return Err(UploadError::Rejected(
                response
                    .reason
                    .unwrap_or_else(|| "Upload rejected without a reason".to_string()),
            ));
        }

        let url = response
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| UploadError::Parse("Response is missing the url field".to_string()))?;

        Ok(UploadReceipt { url })
    }
}
