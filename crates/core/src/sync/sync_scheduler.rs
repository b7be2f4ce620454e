//! Sync cadence constants and orchestrator configuration.

use std::time::Duration;

/// Minimum spacing between non-forced flush attempts, in seconds.
pub const SYNC_MIN_INTERVAL_SECS: u64 = 5 * 60;

/// Number of flush outcomes kept in history.
pub const SYNC_HISTORY_LIMIT: usize = 10;

pub const SYNC_QUEUE_KEY: &str = "qa_sync_queue";
pub const SYNC_PROCESSING_KEY: &str = "qa_sync_processing";
pub const SYNC_LAST_ATTEMPT_KEY: &str = "qa_sync_last_attempt";
pub const SYNC_RESULTS_KEY: &str = "qa_sync_results";

/// Orchestrator tuning and durable store key names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub cooldown: Duration,
    pub history_limit: usize,
    pub queue_key: String,
    pub processing_key: String,
    pub last_attempt_key: String,
    pub history_key: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(SYNC_MIN_INTERVAL_SECS),
            history_limit: SYNC_HISTORY_LIMIT,
            queue_key: SYNC_QUEUE_KEY.to_string(),
            processing_key: SYNC_PROCESSING_KEY.to_string(),
            last_attempt_key: SYNC_LAST_ATTEMPT_KEY.to_string(),
            history_key: SYNC_RESULTS_KEY.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Whether `elapsed` since the last attempt satisfies the cooldown.
    pub fn cooldown_elapsed(&self, elapsed: chrono::Duration) -> bool {
        match elapsed.to_std() {
            Ok(elapsed) => elapsed >= self.cooldown,
            // Last attempt lies in the future; the clock moved backwards.
            Err(_) => true,
        }
    }
}
