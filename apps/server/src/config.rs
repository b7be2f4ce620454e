//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use fieldsync_drive::{DEFAULT_DRIVE_API_URL, DEFAULT_DRIVE_UPLOAD_URL};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8088";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub drive_api_url: String,
    pub drive_upload_url: String,
    /// `None` disables the reachability probe.
    pub probe_interval: Option<Duration>,
    pub sync_cooldown: Option<Duration>,
}

/// Trimmed value with trailing slashes removed; empty counts as unset.
fn env_value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    env_value(lookup, key)
        .map(|v| {
            v.parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, v))
        })
        .transpose()
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr = env_value(&lookup, "FIELDSYNC_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid FIELDSYNC_LISTEN_ADDR '{}'", listen_addr))?;

        let probe_secs = env_secs(&lookup, "FIELDSYNC_PROBE_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS);

        Ok(Self {
            listen_addr,
            data_dir: PathBuf::from(
                env_value(&lookup, "FIELDSYNC_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            drive_api_url: env_value(&lookup, "DRIVE_API_URL")
                .unwrap_or_else(|| DEFAULT_DRIVE_API_URL.to_string()),
            drive_upload_url: env_value(&lookup, "DRIVE_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_DRIVE_UPLOAD_URL.to_string()),
            probe_interval: (probe_secs > 0).then(|| Duration::from_secs(probe_secs)),
            sync_cooldown: env_secs(&lookup, "FIELDSYNC_SYNC_COOLDOWN_SECS")?.map(Duration::from_secs),
        })
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }
}
