//! Google Drive v3 REST client.
//!
//! Only the calls needed to pull project files down and push edited copies
//! back up: list CSV files, download one, overwrite one.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{DriveError, Result};
use crate::types::{ApiErrorResponse, DriveFile, FileList};

pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PING_TIMEOUT_SECS: u64 = 5;
const MAX_LOG_BODY_CHARS: usize = 512;
const CSV_QUERY: &str = "mimeType=\"text/csv\"";
const LIST_FIELDS: &str = "files(id,name,modifiedTime)";

#[derive(Debug, Clone)]
pub struct DriveClient {
    client: reqwest::Client,
    api_url: String,
    upload_url: String,
}

impl DriveClient {
    /// Client against the public Google endpoints.
    pub fn new() -> Result<Self> {
        Self::with_urls(DEFAULT_DRIVE_API_URL, DEFAULT_DRIVE_UPLOAD_URL)
    }

    pub fn with_urls(api_url: &str, upload_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
        })
    }

    fn headers(&self, token: &str) -> Result<HeaderMap> {
        if token.trim().is_empty() {
            return Err(DriveError::auth("Missing access token"));
        }
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| DriveError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    fn file_id_segment(file_id: &str) -> Result<String> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(DriveError::invalid_request("File id is required"));
        }
        Ok(urlencoding::encode(file_id).into_owned())
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[Drive] Response status: {}", status);
            return;
        }
        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[Drive] Response error ({}): {}", status, preview);
    }

    /// Reads the body, turning non-2xx statuses into `DriveError::Api`.
    async fn response_text(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(error) => match error.error.status {
                    Some(code) => format!("{}: {}", code, error.error.message),
                    None => error.error.message,
                },
                Err(_) => format!("Request failed: {}", body),
            };
            return Err(DriveError::api(status.as_u16(), message));
        }
        Ok(body)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let body = Self::response_text(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET /drive/v3/files?q=mimeType="text/csv"
    pub async fn list_csv_files(&self, token: &str) -> Result<Vec<DriveFile>> {
        let url = format!(
            "{}/drive/v3/files?q={}&fields={}",
            self.api_url,
            urlencoding::encode(CSV_QUERY),
            urlencoding::encode(LIST_FIELDS)
        );
        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;
        let list: FileList = Self::parse_response(response).await?;
        debug!("[Drive] Listed {} CSV files", list.files.len());
        Ok(list.files)
    }

    /// GET /drive/v3/files/{id}?alt=media
    pub async fn download_file(&self, token: &str, file_id: &str) -> Result<String> {
        let url = format!(
            "{}/drive/v3/files/{}?alt=media",
            self.api_url,
            Self::file_id_segment(file_id)?
        );
        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;
        Self::response_text(response).await
    }

    /// PATCH /upload/drive/v3/files/{id}?uploadType=media
    ///
    /// Replaces the whole file content; metadata is left as is.
    pub async fn update_file(&self, token: &str, file_id: &str, content: &str) -> Result<DriveFile> {
        let url = format!(
            "{}/drive/v3/files/{}?uploadType=media",
            self.upload_url,
            Self::file_id_segment(file_id)?
        );
        let mut headers = self.headers(token)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        let response = self
            .client
            .patch(&url)
            .headers(headers)
            .body(content.to_string())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Whether the API host answers at all. Any HTTP status counts as reachable.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/drive/v3/about", self.api_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(_) => true,
            Err(err) => {
                debug!("[Drive] Ping failed: {}", err);
                false
            }
        }
    }
}
