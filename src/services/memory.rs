use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::models::{MatchRecord, NotificationHistoryEntry, PairKey, RawJob, UserPreference};
use crate::services::traits::{
    HealthCheck, HistoryStore, JobSource, MatchStore, StoreError, UserSource,
};

/// Failures the in-memory store should simulate
#[derive(Debug, Clone, Default)]
pub struct FailureInjection {
    pub users_unavailable: bool,
    pub jobs_unavailable: bool,
    pub history_unavailable: bool,
    pub failing_match_writes: HashSet<PairKey>,
    pub failing_history_writes: HashSet<PairKey>,
}

/// In-process implementation of every store capability
///
/// Used by tests and by local dry runs. History is kept append-only
/// like the real ledger.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<UserPreference>>,
    jobs: RwLock<Vec<RawJob>>,
    history: RwLock<Vec<NotificationHistoryEntry>>,
    matches: RwLock<HashMap<PairKey, MatchRecord>>,
    failures: RwLock<FailureInjection>,
}

impl InMemoryStore {
    pub fn new(users: Vec<UserPreference>, jobs: Vec<RawJob>) -> Self {
        Self {
            users: RwLock::new(users),
            jobs: RwLock::new(jobs),
            ..Self::default()
        }
    }

    pub async fn set_jobs(&self, jobs: Vec<RawJob>) {
        *self.jobs.write().await = jobs;
    }

    pub async fn set_users(&self, users: Vec<UserPreference>) {
        *self.users.write().await = users;
    }

    pub async fn inject_failures(&self, failures: FailureInjection) {
        *self.failures.write().await = failures;
    }

    pub async fn history(&self) -> Vec<NotificationHistoryEntry> {
        self.history.read().await.clone()
    }

    pub async fn matches(&self) -> HashMap<PairKey, MatchRecord> {
        self.matches.read().await.clone()
    }
}

#[async_trait]
impl UserSource for InMemoryStore {
    async fn completed_users(&self) -> Result<Vec<UserPreference>, StoreError> {
        if self.failures.read().await.users_unavailable {
            return Err(StoreError::Unavailable("user source offline".to_string()));
        }
        Ok(self.users.read().await.clone())
    }
}

#[async_trait]
impl JobSource for InMemoryStore {
    async fn jobs(&self) -> Result<Vec<RawJob>, StoreError> {
        if self.failures.read().await.jobs_unavailable {
            return Err(StoreError::Unavailable("job source offline".to_string()));
        }
        Ok(self.jobs.read().await.clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn latest_sent_at(
        &self,
        pairs: &[PairKey],
    ) -> Result<HashMap<PairKey, DateTime<Utc>>, StoreError> {
        if self.failures.read().await.history_unavailable {
            return Err(StoreError::Unavailable("history ledger offline".to_string()));
        }

        let wanted: HashSet<&PairKey> = pairs.iter().collect();
        let mut latest: HashMap<PairKey, DateTime<Utc>> = HashMap::new();

        for entry in self.history.read().await.iter() {
            let key = PairKey::new(&entry.user_id, &entry.job_id);
            if !wanted.contains(&key) {
                continue;
            }
            latest
                .entry(key)
                .and_modify(|sent_at| *sent_at = (*sent_at).max(entry.sent_at))
                .or_insert(entry.sent_at);
        }

        Ok(latest)
    }

    async fn append(&self, entry: &NotificationHistoryEntry) -> Result<(), StoreError> {
        let key = PairKey::new(&entry.user_id, &entry.job_id);
        if self.failures.read().await.failing_history_writes.contains(&key) {
            return Err(StoreError::Unavailable(format!(
                "history write rejected for {} -> {}",
                entry.user_id, entry.job_id
            )));
        }
        self.history.write().await.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn upsert(&self, record: &MatchRecord) -> Result<(), StoreError> {
        let key = PairKey::new(&record.user_id, &record.job_id);
        if self.failures.read().await.failing_match_writes.contains(&key) {
            return Err(StoreError::Unavailable(format!(
                "match write rejected for {} -> {}",
                record.user_id, record.job_id
            )));
        }
        self.matches.write().await.insert(key, record.clone());
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn is_healthy(&self) -> bool {
        !self.failures.read().await.history_unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(user: &str, job: &str, sent_at: DateTime<Utc>) -> NotificationHistoryEntry {
        NotificationHistoryEntry {
            user_id: user.to_string(),
            job_id: job.to_string(),
            sent_at,
        }
    }

    #[test]
    fn test_latest_sent_at_takes_maximum() {
        tokio_test::block_on(async {
            let store = InMemoryStore::default();
            let now = Utc::now();

            store.append(&entry("u1", "j1", now - Duration::days(20))).await.unwrap();
            store.append(&entry("u1", "j1", now - Duration::days(2))).await.unwrap();
            store.append(&entry("u2", "j1", now)).await.unwrap();

            let latest = store
                .latest_sent_at(&[PairKey::new("u1", "j1"), PairKey::new("u1", "j2")])
                .await
                .unwrap();

            assert_eq!(latest.len(), 1);
            assert_eq!(latest[&PairKey::new("u1", "j1")], now - Duration::days(2));
            assert_eq!(store.history().await.len(), 3);
        });
    }

    #[tokio::test]
    async fn test_upsert_merges_by_pair() {
        let store = InMemoryStore::default();
        let now = Utc::now();
        let mut record = MatchRecord {
            user_id: "u1".to_string(),
            job_id: "j1".to_string(),
            title: "Old".to_string(),
            url: "j1".to_string(),
            matched_at: now,
        };

        store.upsert(&record).await.unwrap();
        record.title = "New".to_string();
        store.upsert(&record).await.unwrap();

        let matches = store.matches().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[&PairKey::new("u1", "j1")].title, "New");
    }

    #[tokio::test]
    async fn test_injected_source_failure() {
        let store = InMemoryStore::default();
        store
            .inject_failures(FailureInjection {
                users_unavailable: true,
                ..FailureInjection::default()
            })
            .await;

        assert!(store.completed_users().await.is_err());
        assert!(store.jobs().await.is_ok());
    }
}
