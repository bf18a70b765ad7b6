use rayon::prelude::*;

use crate::core::{
    bulk::BulkMatcher,
    criteria::Criterion,
    normalizer::JobNormalizer,
};
use crate::models::{MatchCandidate, NormalizedJob, RawJob, UserPreference};

/// How the user × job cross product is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Every pair checked against the criteria, users scanned in parallel
    #[default]
    Row,
    /// Jobs indexed once, candidate sets computed with set operations
    Bulk,
}

/// Result of the matching stage of a run
#[derive(Debug)]
pub struct MatchResult {
    pub candidates: Vec<MatchCandidate>,
    pub pairs_evaluated: u64,
}

/// Match engine - applies every criterion to (user, job) pairs
///
/// # Pipeline Stages
/// 1. Job normalization (once per job)
/// 2. Domain criterion
/// 3. Location criterion
/// 4. Experience / status criterion
/// 5. Leadership criterion
///
/// Stages short-circuit; a pair becomes a candidate only if all pass.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    normalizer: JobNormalizer,
    strategy: MatchStrategy,
}

impl Matcher {
    pub fn new(normalizer: JobNormalizer, strategy: MatchStrategy) -> Self {
        Self { normalizer, strategy }
    }

    pub fn normalizer(&self) -> &JobNormalizer {
        &self.normalizer
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Normalize a preference and a raw job, then evaluate the pair
    pub fn evaluate(&self, user: &UserPreference, raw: &RawJob) -> Option<MatchCandidate> {
        let job = self.normalizer.normalize(raw);
        self.evaluate_normalized(user, &job)
    }

    /// Evaluate an already normalized job; the preference is normalized here
    pub fn evaluate_normalized(
        &self,
        user: &UserPreference,
        job: &NormalizedJob,
    ) -> Option<MatchCandidate> {
        evaluate_pair(&user.clone().normalized(), job)
    }

    /// Normalize a batch of raw jobs in parallel
    pub fn normalize_all(&self, raws: &[RawJob]) -> Vec<NormalizedJob> {
        raws.par_iter().map(|raw| self.normalizer.normalize(raw)).collect()
    }

    /// Evaluate the full cross product with the configured strategy
    ///
    /// Preferences are normalized once up front, so callers may pass them
    /// exactly as the user source returned them.
    pub fn find_candidates(&self, users: &[UserPreference], jobs: &[NormalizedJob]) -> MatchResult {
        let users: Vec<UserPreference> = users
            .par_iter()
            .map(|user| user.clone().normalized())
            .collect();

        let candidates = match self.strategy {
            MatchStrategy::Row => find_candidates_row(&users, jobs),
            MatchStrategy::Bulk => BulkMatcher::new(jobs).find_candidates(&users),
        };

        MatchResult {
            candidates,
            pairs_evaluated: (users.len() as u64) * (jobs.len() as u64),
        }
    }
}

/// Row-at-a-time evaluation; users are partitioned across the rayon pool
fn find_candidates_row(users: &[UserPreference], jobs: &[NormalizedJob]) -> Vec<MatchCandidate> {
    users
        .par_iter()
        .flat_map_iter(|user| jobs.iter().filter_map(move |job| evaluate_pair(user, job)))
        .collect()
}

/// `user` must already be normalized
fn evaluate_pair(user: &UserPreference, job: &NormalizedJob) -> Option<MatchCandidate> {
    if let Some(failed) = first_failure(user, job) {
        tracing::trace!(
            "Pair rejected: user={} job={} criterion={:?}",
            user.user_id,
            job.id,
            failed
        );
        return None;
    }

    Some(candidate(user, job))
}

/// First criterion the pair fails, in evaluation order
pub fn first_failure(user: &UserPreference, job: &NormalizedJob) -> Option<Criterion> {
    Criterion::EVALUATION_ORDER
        .into_iter()
        .find(|criterion| !criterion.check(user, job))
}

pub(crate) fn candidate(user: &UserPreference, job: &NormalizedJob) -> MatchCandidate {
    MatchCandidate {
        user_id: user.user_id.clone(),
        job_id: job.id.clone(),
        job_title: job.title.clone(),
        job_url: job.url().to_string(),
        user_status: user.status,
    }
}
