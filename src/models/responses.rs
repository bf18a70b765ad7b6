use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome class of a matching pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    PartialSuccess,
}

/// Run-level counters returned by a matching pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub candidates_evaluated: u64,
    pub matches_accepted: u64,
    pub notifications_suppressed: u64,
    /// Pairs the throttle let through, i.e. writes attempted
    pub notifications_attempted: u64,
    /// Pairs whose match upsert and history append both committed
    pub notifications_sent: u64,
    pub match_write_failures: u64,
    pub history_write_failures: u64,
}

impl RunSummary {
    pub fn is_partial(&self) -> bool {
        self.status == RunStatus::PartialSuccess
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
