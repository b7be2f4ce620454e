//! `RemoteTransport` over Google Drive, with the access token kept in the durable store.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use fieldsync_core::store::DurableStore;
use fieldsync_core::transport::{RemoteTransport, UploadReceipt};
use fieldsync_core::Error;

use crate::client::DriveClient;
use crate::types::DriveFile;

pub const DRIVE_TOKEN_KEY: &str = "drive_access_token";

pub struct DriveTransport {
    client: DriveClient,
    store: Arc<dyn DurableStore>,
}

impl DriveTransport {
    pub fn new(client: DriveClient, store: Arc<dyn DurableStore>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    pub async fn set_access_token(&self, token: &str) -> fieldsync_core::Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::validation("Access token must not be empty"));
        }
        self.store.set(DRIVE_TOKEN_KEY, token).await
    }

    pub async fn clear_access_token(&self) -> fieldsync_core::Result<()> {
        self.store.remove(DRIVE_TOKEN_KEY).await
    }

    async fn access_token(&self) -> fieldsync_core::Result<String> {
        self.store
            .get(DRIVE_TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::unauthenticated("Not authenticated with Google Drive"))
    }

    pub async fn list_csv_files(&self) -> fieldsync_core::Result<Vec<DriveFile>> {
        let token = self.access_token().await?;
        Ok(self.client.list_csv_files(&token).await?)
    }
}

#[async_trait]
impl RemoteTransport for DriveTransport {
    async fn is_authenticated(&self) -> bool {
        match self.access_token().await {
            Ok(_) => true,
            Err(Error::Unauthenticated(_)) => false,
            Err(err) => {
                warn!("[Drive] Could not read access token: {}", err);
                false
            }
        }
    }

    async fn upload(&self, remote_id: &str, content: &str) -> fieldsync_core::Result<UploadReceipt> {
        let token = self.access_token().await?;
        let file = self.client.update_file(&token, remote_id, content).await?;
        debug!("[Drive] Updated {} ({} bytes)", file.id, content.len());
        Ok(UploadReceipt {
            remote_id: file.id,
            status: "updated".to_string(),
        })
    }

    async fn download(&self, remote_id: &str) -> fieldsync_core::Result<String> {
        let token = self.access_token().await?;
        Ok(self.client.download_file(&token, remote_id).await?)
    }
}
