//! Capabilities the reconciler needs from the outside world.
//!
//! Each store client is constructed once per process and handed to the
//! reconciler behind these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{MatchRecord, NotificationHistoryEntry, PairKey, RawJob, UserPreference};
use crate::services::{AppwriteError, PostgresError};

/// Errors surfaced by any store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Appwrite error: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Source of user preferences; callers only ever see completed profiles
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn completed_users(&self) -> Result<Vec<UserPreference>, StoreError>;
}

/// Source of raw job postings
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn jobs(&self) -> Result<Vec<RawJob>, StoreError>;
}

/// Append-only notification ledger
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent `sent_at` per pair. Pairs never notified are absent.
    async fn latest_sent_at(
        &self,
        pairs: &[PairKey],
    ) -> Result<HashMap<PairKey, DateTime<Utc>>, StoreError>;

    async fn append(&self, entry: &NotificationHistoryEntry) -> Result<(), StoreError>;
}

/// Persisted matches, merged by (user_id, job_id)
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn upsert(&self, record: &MatchRecord) -> Result<(), StoreError>;
}

/// Liveness probe for the backing store
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn is_healthy(&self) -> bool;
}
