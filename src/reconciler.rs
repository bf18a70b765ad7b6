//! Reconciliation driver: one matching pass over every user and job.
//!
//! All reads (users, jobs, notification history) happen before the first
//! write, so an unavailable source aborts the run without side effects.
//! For each pair the throttle lets through, the match is upserted first and
//! the history row appended only after that succeeds. A crash in between can
//! cause a duplicate match write on retry, never a silently lost notification.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::core::{Matcher, Throttle, ThrottleDecision};
use crate::models::{
    MatchCandidate, MatchRecord, NormalizedJob, NotificationHistoryEntry, RunStatus, RunSummary,
};
use crate::services::{HistoryStore, JobSource, MatchStore, StoreError, UserSource};

/// Default number of pairs persisted concurrently
pub const DEFAULT_WRITE_CONCURRENCY: usize = 8;

/// Failures that abort a run before any write
#[derive(Debug, Error)]
pub enum RunError {
    #[error("User source unavailable: {0}")]
    UserSource(#[source] StoreError),

    #[error("Job source unavailable: {0}")]
    JobSource(#[source] StoreError),

    #[error("History source unavailable: {0}")]
    HistorySource(#[source] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairOutcome {
    Sent,
    MatchWriteFailed,
    HistoryWriteFailed,
}

#[derive(Debug, Default)]
struct WriteTally {
    sent: u64,
    match_write_failures: u64,
    history_write_failures: u64,
}

impl WriteTally {
    fn record(&mut self, outcome: PairOutcome) {
        match outcome {
            PairOutcome::Sent => self.sent += 1,
            PairOutcome::MatchWriteFailed => self.match_write_failures += 1,
            PairOutcome::HistoryWriteFailed => self.history_write_failures += 1,
        }
    }

    fn failures(&self) -> u64 {
        self.match_write_failures + self.history_write_failures
    }
}

/// Runs matching passes against injected store capabilities
pub struct Reconciler {
    users: Arc<dyn UserSource>,
    jobs: Arc<dyn JobSource>,
    history: Arc<dyn HistoryStore>,
    matches: Arc<dyn MatchStore>,
    matcher: Matcher,
    throttle: Throttle,
    write_concurrency: usize,
}

impl Reconciler {
    pub fn new(
        users: Arc<dyn UserSource>,
        jobs: Arc<dyn JobSource>,
        history: Arc<dyn HistoryStore>,
        matches: Arc<dyn MatchStore>,
        matcher: Matcher,
        throttle: Throttle,
    ) -> Self {
        Self {
            users,
            jobs,
            history,
            matches,
            matcher,
            throttle,
            write_concurrency: DEFAULT_WRITE_CONCURRENCY,
        }
    }

    pub fn with_write_concurrency(mut self, write_concurrency: usize) -> Self {
        self.write_concurrency = write_concurrency.max(1);
        self
    }

    /// Run a matching pass with `now` as the notification clock
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, RunError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        tracing::info!("Starting matching pass {}", run_id);

        let users = self.users.completed_users().await.map_err(|e| {
            tracing::error!("Run {} aborted, user source failed: {}", run_id, e);
            RunError::UserSource(e)
        })?;
        let raw_jobs = self.jobs.jobs().await.map_err(|e| {
            tracing::error!("Run {} aborted, job source failed: {}", run_id, e);
            RunError::JobSource(e)
        })?;

        let jobs = unique_jobs(self.matcher.normalize_all(&raw_jobs));

        tracing::debug!("Run {}: {} users, {} jobs", run_id, users.len(), jobs.len());

        let result = self.matcher.find_candidates(&users, &jobs);
        let matches_accepted = result.candidates.len() as u64;

        let pairs: Vec<_> = result.candidates.iter().map(MatchCandidate::pair).collect();
        let latest = self.history.latest_sent_at(&pairs).await.map_err(|e| {
            tracing::error!("Run {} aborted, history source failed: {}", run_id, e);
            RunError::HistorySource(e)
        })?;

        let mut to_notify = Vec::new();
        let mut suppressed = 0u64;
        for candidate in result.candidates {
            let last_sent_at = latest.get(&candidate.pair()).copied();
            match self.throttle.decide(candidate.user_status, last_sent_at, now) {
                ThrottleDecision::Suppressed {
                    days_since,
                    cooldown_days,
                } => {
                    tracing::trace!(
                        "Suppressed {} -> {}: {} of {} cooldown days",
                        candidate.user_id,
                        candidate.job_id,
                        days_since,
                        cooldown_days
                    );
                    suppressed += 1;
                }
                _ => to_notify.push(candidate),
            }
        }

        let attempted = to_notify.len() as u64;
        let tally = self.persist(to_notify, now).await;

        let status = if tally.failures() > 0 {
            tracing::warn!(
                "Run {} partially failed: {} match writes, {} history writes",
                run_id,
                tally.match_write_failures,
                tally.history_write_failures
            );
            RunStatus::PartialSuccess
        } else {
            RunStatus::Completed
        };

        let summary = RunSummary {
            run_id,
            status,
            started_at,
            finished_at: Utc::now(),
            candidates_evaluated: result.pairs_evaluated,
            matches_accepted,
            notifications_suppressed: suppressed,
            notifications_attempted: attempted,
            notifications_sent: tally.sent,
            match_write_failures: tally.match_write_failures,
            history_write_failures: tally.history_write_failures,
        };

        tracing::info!(
            "Finished matching pass {}: evaluated={} accepted={} sent={} suppressed={}",
            run_id,
            summary.candidates_evaluated,
            summary.matches_accepted,
            summary.notifications_sent,
            summary.notifications_suppressed
        );

        Ok(summary)
    }

    async fn persist(&self, candidates: Vec<MatchCandidate>, now: DateTime<Utc>) -> WriteTally {
        let semaphore = Arc::new(Semaphore::new(self.write_concurrency));
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let semaphore = Arc::clone(&semaphore);
            let matches = Arc::clone(&self.matches);
            let history = Arc::clone(&self.history);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                persist_pair(matches.as_ref(), history.as_ref(), &candidate, now).await
            });
        }

        let mut tally = WriteTally::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => tally.record(outcome),
                Err(e) => {
                    tracing::warn!("Write task did not complete: {}", e);
                    tally.record(PairOutcome::MatchWriteFailed);
                }
            }
        }

        tally
    }
}

async fn persist_pair(
    matches: &dyn MatchStore,
    history: &dyn HistoryStore,
    candidate: &MatchCandidate,
    now: DateTime<Utc>,
) -> PairOutcome {
    let record = MatchRecord::from_candidate(candidate, now);
    if let Err(e) = matches.upsert(&record).await {
        tracing::warn!(
            "Match write failed for {} -> {}: {}",
            candidate.user_id,
            candidate.job_id,
            e
        );
        return PairOutcome::MatchWriteFailed;
    }

    let entry = NotificationHistoryEntry {
        user_id: candidate.user_id.clone(),
        job_id: candidate.job_id.clone(),
        sent_at: now,
    };
    if let Err(e) = history.append(&entry).await {
        tracing::warn!(
            "History write failed for {} -> {}: {}",
            candidate.user_id,
            candidate.job_id,
            e
        );
        return PairOutcome::HistoryWriteFailed;
    }

    PairOutcome::Sent
}

/// Drop jobs without an identifier and repeated postings of the same URL
fn unique_jobs(jobs: Vec<NormalizedJob>) -> Vec<NormalizedJob> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| {
            if job.id.is_empty() {
                tracing::warn!("Skipping job without a URL: {:?}", job.title);
                return false;
            }
            seen.insert(job.id.clone())
        })
        .collect()
}
