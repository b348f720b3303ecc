//! Asset store adapter over the Google Drive v3 upload API.
//!
//! One JPEG per submission lands in a fixed folder via a single
//! `multipart/related` request; the returned `webViewLink` is what gets
//! stored as the record's image reference. No retry: the caller treats a
//! failed upload as a warning, not a fatal error.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::services::auth::TokenProvider;
use crate::services::{AssetStore, StoreError};

const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

const BOUNDARY: &str = "field_ops_tracker_media";

pub struct DriveClient {
    http: reqwest::Client,
    upload_url: String,
    folder_id: String,
    auth: Arc<TokenProvider>,
}

#[derive(Deserialize)]
struct DriveFile {
    #[serde(rename = "webViewLink")]
    web_view_link: String,
}

impl DriveClient {
    pub fn new(folder_id: &str, auth: Arc<TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
            folder_id: folder_id.to_string(),
            auth,
        }
    }
}

#[async_trait]
impl AssetStore for DriveClient {
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, StoreError> {
        let token = self.auth.bearer_token().await?;
        let metadata = serde_json::json!({
            "name": name,
            "parents": [self.folder_id],
        });

        let url = format!("{}?uploadType=multipart&fields=id,webViewLink", self.upload_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(multipart_related_body(&metadata, &bytes))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("photo upload failed: {status}: {body}")));
        }

        let file: DriveFile = response.json().await?;
        Ok(file.web_view_link)
    }
}

/// Frame the metadata JSON and JPEG bytes as one `multipart/related` body,
/// per the Drive multipart upload protocol.
fn multipart_related_body(metadata: &serde_json::Value, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
