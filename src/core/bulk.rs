//! Set-oriented evaluation of the match criteria.
//!
//! Jobs are indexed once per run; each user's candidate set is then computed
//! with unions and intersections over job-index sets instead of evaluating
//! every pair. The result must equal row-at-a-time evaluation exactly.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::core::criteria::REMOTE;
use crate::core::matcher::candidate;
use crate::models::{ManagementInterest, MatchCandidate, NormalizedJob, UserPreference, UserStatus};

pub(crate) type JobSet = BTreeSet<usize>;

/// Inverted indices over one run's normalized jobs
pub(crate) struct BulkMatcher<'a> {
    jobs: &'a [NormalizedJob],
    all: JobSet,
    by_domain: HashMap<&'a str, JobSet>,
    /// Jobs with no domain, compatible with every domain preference
    open_domain: JobSet,
    by_location: HashMap<&'a str, JobSet>,
    /// Jobs with no location or with the remote wildcard
    open_location: JobSet,
    student: JobSet,
    zero_experience: JobSet,
    by_leadership: HashMap<&'a str, JobSet>,
    individual: JobSet,
}

impl<'a> BulkMatcher<'a> {
    pub(crate) fn new(jobs: &'a [NormalizedJob]) -> Self {
        let mut index = Self {
            jobs,
            all: (0..jobs.len()).collect(),
            by_domain: HashMap::new(),
            open_domain: JobSet::new(),
            by_location: HashMap::new(),
            open_location: JobSet::new(),
            student: JobSet::new(),
            zero_experience: JobSet::new(),
            by_leadership: HashMap::new(),
            individual: JobSet::new(),
        };

        for (i, job) in jobs.iter().enumerate() {
            if job.domains.is_empty() {
                index.open_domain.insert(i);
            }
            for domain in &job.domains {
                index.by_domain.entry(domain.as_str()).or_default().insert(i);
            }

            if job.locations.is_empty() || job.locations.contains(REMOTE) {
                index.open_location.insert(i);
            }
            for location in &job.locations {
                index.by_location.entry(location.as_str()).or_default().insert(i);
            }

            if job.is_student_job {
                index.student.insert(i);
            }
            if job.experience.accepts_zero() {
                index.zero_experience.insert(i);
            }

            match &job.leadership_level {
                Some(level) => {
                    index.by_leadership.entry(level.as_str()).or_default().insert(i);
                }
                None => {
                    index.individual.insert(i);
                }
            }
        }

        index
    }

    /// Candidate sets for every user, computed in parallel across users.
    /// Preferences must already be normalized.
    pub(crate) fn find_candidates(&self, users: &[UserPreference]) -> Vec<MatchCandidate> {
        users
            .par_iter()
            .flat_map_iter(|user| {
                self.candidate_jobs(user)
                    .into_iter()
                    .map(move |i| candidate(user, &self.jobs[i]))
            })
            .collect()
    }

    /// Indices of jobs that satisfy every criterion for `user`
    pub(crate) fn candidate_jobs(&self, user: &UserPreference) -> JobSet {
        let domain = self.domain_set(user);
        if domain.is_empty() {
            return domain;
        }

        let location = self.location_set(user);
        let mut eligible: JobSet = domain.intersection(&location).copied().collect();

        eligible = self.filter_experience(user, eligible);
        let leadership = self.leadership_set(user);
        eligible.retain(|i| leadership.contains(i));
        eligible
    }

    fn domain_set(&self, user: &UserPreference) -> JobSet {
        if user.domains.is_empty() {
            return self.all.clone();
        }
        union_of(&self.open_domain, &self.by_domain, &user.domains)
    }

    fn location_set(&self, user: &UserPreference) -> JobSet {
        if user.locations.is_empty() || user.locations.contains(REMOTE) {
            return self.all.clone();
        }
        union_of(&self.open_location, &self.by_location, &user.locations)
    }

    fn filter_experience(&self, user: &UserPreference, mut eligible: JobSet) -> JobSet {
        match user.status {
            UserStatus::StudentPosition => eligible.retain(|i| self.student.contains(i)),
            UserStatus::NoExperiencePosition => eligible.retain(|i| self.zero_experience.contains(i)),
            UserStatus::ExperiencePosition => {
                let (low, high) = (user.min_years(), user.max_years());
                eligible.retain(|&i| self.jobs[i].experience.overlaps(low, high));
            }
        }
        eligible
    }

    fn leadership_set(&self, user: &UserPreference) -> JobSet {
        let wanted = || {
            user.management_level
                .iter()
                .filter_map(|level| self.by_leadership.get(level.as_str()))
                .flatten()
                .copied()
                .collect::<JobSet>()
        };

        match user.effective_management_interest() {
            ManagementInterest::Unspecified | ManagementInterest::NoManagement => {
                self.individual.clone()
            }
            ManagementInterest::ManagementOnly => wanted(),
            ManagementInterest::ManagementAndIndividual => {
                let mut set = wanted();
                set.extend(self.individual.iter().copied());
                set
            }
        }
    }
}

fn union_of(
    open: &JobSet,
    index: &HashMap<&str, JobSet>,
    keys: &BTreeSet<String>,
) -> JobSet {
    let mut set = open.clone();
    for key in keys {
        if let Some(jobs) = index.get(key.as_str()) {
            set.extend(jobs.iter().copied());
        }
    }
    set
}
