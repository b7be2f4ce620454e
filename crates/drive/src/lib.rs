//! Google Drive access for project files.

mod client;
mod error;
mod transport;
mod types;

pub use client::{DriveClient, DEFAULT_DRIVE_API_URL, DEFAULT_DRIVE_UPLOAD_URL};
pub use error::{ApiRetryClass, DriveError, Result};
pub use transport::{DriveTransport, DRIVE_TOKEN_KEY};
pub use types::DriveFile;
