use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::{MatchRecord, NotificationHistoryEntry, PairKey, RawJob};
use crate::services::traits::{HealthCheck, HistoryStore, JobSource, MatchStore, StoreError};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL store for job postings, the notification ledger and
/// persisted matches
///
/// `notification_history` is append-only: rows are inserted, never updated
/// or deleted. `user_matches` is keyed by (user_id, job_id) and merged on
/// conflict so retried runs stay idempotent.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    /// Load every active job posting
    pub async fn fetch_jobs(&self) -> Result<Vec<RawJob>, PostgresError> {
        let query = r#"
            SELECT title, source_url, locations, job_scope,
                   experience_level, leadership_level, experience_levels
            FROM job_postings
            WHERE is_active = TRUE
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let jobs = rows
            .iter()
            .map(|row| {
                let levels: Option<Vec<i32>> = row.get("experience_levels");
                RawJob {
                    title: row.get("title"),
                    source_url: row.get("source_url"),
                    locations: row.get("locations"),
                    job_scope: row.get("job_scope"),
                    experience_level: row.get("experience_level"),
                    leadership_level: row.get("leadership_level"),
                    experience_levels: levels.map(|levels| {
                        levels
                            .into_iter()
                            .filter_map(|level| u32::try_from(level).ok())
                            .collect()
                    }),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Loaded {} job postings", jobs.len());

        Ok(jobs)
    }

    /// Most recent send time per (user, job) pair, in a single round-trip
    pub async fn fetch_latest_sent_at(
        &self,
        pairs: &[PairKey],
    ) -> Result<HashMap<PairKey, DateTime<Utc>>, PostgresError> {
        if pairs.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT h.user_id, h.job_id, MAX(h.sent_at) AS last_sent_at
            FROM notification_history h
            JOIN UNNEST($1::text[], $2::text[]) AS p(user_id, job_id)
              ON h.user_id = p.user_id AND h.job_id = p.job_id
            GROUP BY h.user_id, h.job_id
        "#;

        let user_ids: Vec<String> = pairs.iter().map(|p| p.user_id.clone()).collect();
        let job_ids: Vec<String> = pairs.iter().map(|p| p.job_id.clone()).collect();

        let rows = sqlx::query(query)
            .bind(&user_ids)
            .bind(&job_ids)
            .fetch_all(&self.pool)
            .await?;

        let latest = rows
            .iter()
            .map(|row| {
                let key = PairKey {
                    user_id: row.get("user_id"),
                    job_id: row.get("job_id"),
                };
                (key, row.get::<DateTime<Utc>, _>("last_sent_at"))
            })
            .collect::<HashMap<_, _>>();

        tracing::debug!(
            "Loaded notification history for {} of {} pairs",
            latest.len(),
            pairs.len()
        );

        Ok(latest)
    }

    /// Append a row to the notification ledger
    pub async fn insert_history(&self, entry: &NotificationHistoryEntry) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO notification_history (user_id, job_id, sent_at)
            VALUES ($1, $2, $3)
        "#;

        sqlx::query(query)
            .bind(&entry.user_id)
            .bind(&entry.job_id)
            .bind(entry.sent_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upsert a match
    ///
    /// Uses INSERT ... ON CONFLICT so a retried run merges instead of duplicating.
    pub async fn upsert_match(&self, record: &MatchRecord) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO user_matches (user_id, job_id, title, url, matched_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, job_id)
            DO UPDATE SET
                title = EXCLUDED.title,
                url = EXCLUDED.url,
                matched_at = EXCLUDED.matched_at
        "#;

        sqlx::query(query)
            .bind(&record.user_id)
            .bind(&record.job_id)
            .bind(&record.title)
            .bind(&record.url)
            .bind(record.matched_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Upserted match: {} -> {}", record.user_id, record.job_id);

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl JobSource for PostgresStore {
    async fn jobs(&self) -> Result<Vec<RawJob>, StoreError> {
        Ok(self.fetch_jobs().await?)
    }
}

#[async_trait]
impl HistoryStore for PostgresStore {
    async fn latest_sent_at(
        &self,
        pairs: &[PairKey],
    ) -> Result<HashMap<PairKey, DateTime<Utc>>, StoreError> {
        Ok(self.fetch_latest_sent_at(pairs).await?)
    }

    async fn append(&self, entry: &NotificationHistoryEntry) -> Result<(), StoreError> {
        Ok(self.insert_history(entry).await?)
    }
}

#[async_trait]
impl MatchStore for PostgresStore {
    async fn upsert(&self, record: &MatchRecord) -> Result<(), StoreError> {
        Ok(self.upsert_match(record).await?)
    }
}

#[async_trait]
impl HealthCheck for PostgresStore {
    async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}
