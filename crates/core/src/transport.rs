//! Remote file transport contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Acknowledgement returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub remote_id: String,
    pub status: String,
}

/// Uploads and downloads whole remote files.
///
/// Implementations report `Error::Unauthenticated` for rejected or missing
/// credentials and `Error::Network` for everything else. Timeouts are the
/// implementation's concern.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    async fn upload(&self, remote_id: &str, content: &str) -> Result<UploadReceipt>;

    async fn download(&self, remote_id: &str) -> Result<String>;
}
