use std::collections::BTreeSet;

use crate::models::{ManagementInterest, NormalizedJob, UserPreference, UserStatus};

/// Location token that satisfies the location criterion on either side
pub const REMOTE: &str = "remote";

/// The four independent compatibility criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Domain,
    Location,
    Experience,
    Leadership,
}

impl Criterion {
    /// Cheapest and most selective first
    pub const EVALUATION_ORDER: [Criterion; 4] = [
        Criterion::Domain,
        Criterion::Location,
        Criterion::Experience,
        Criterion::Leadership,
    ];

    #[inline]
    pub fn check(self, user: &UserPreference, job: &NormalizedJob) -> bool {
        match self {
            Criterion::Domain => matches_domain(user, job),
            Criterion::Location => matches_location(user, job),
            Criterion::Experience => matches_experience(user, job),
            Criterion::Leadership => matches_leadership(user, job),
        }
    }
}

/// Status-dependent experience check
#[inline]
pub fn matches_experience(user: &UserPreference, job: &NormalizedJob) -> bool {
    match user.status {
        UserStatus::StudentPosition => job.is_student_job,
        UserStatus::NoExperiencePosition => job.experience.accepts_zero(),
        UserStatus::ExperiencePosition => job
            .experience
            .overlaps(user.min_years(), user.max_years()),
    }
}

/// Open-preference domain check: an empty set on either side passes
#[inline]
pub fn matches_domain(user: &UserPreference, job: &NormalizedJob) -> bool {
    open_or_intersecting(&user.domains, &job.domains)
}

/// Location check with `remote` acting as a wildcard on either side
#[inline]
pub fn matches_location(user: &UserPreference, job: &NormalizedJob) -> bool {
    if user.locations.contains(REMOTE) || job.locations.contains(REMOTE) {
        return true;
    }
    open_or_intersecting(&user.locations, &job.locations)
}

/// Leadership policy keyed by the user's effective management interest
#[inline]
pub fn matches_leadership(user: &UserPreference, job: &NormalizedJob) -> bool {
    let level_wanted = |level: &String| user.management_level.contains(level);

    match (user.effective_management_interest(), &job.leadership_level) {
        (ManagementInterest::Unspecified | ManagementInterest::NoManagement, level) => level.is_none(),
        (ManagementInterest::ManagementOnly, Some(level)) => level_wanted(level),
        (ManagementInterest::ManagementOnly, None) => false,
        (ManagementInterest::ManagementAndIndividual, Some(level)) => level_wanted(level),
        (ManagementInterest::ManagementAndIndividual, None) => true,
    }
}

#[inline]
fn open_or_intersecting(left: &BTreeSet<String>, right: &BTreeSet<String>) -> bool {
    left.is_empty() || right.is_empty() || !left.is_disjoint(right)
}
