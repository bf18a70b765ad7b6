use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::core::normalizer::canonical_token;

/// Which kind of position a user is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    StudentPosition,
    NoExperiencePosition,
    ExperiencePosition,
}

/// How a user feels about people-management roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementInterest {
    #[default]
    #[serde(rename = "none")]
    Unspecified,
    NoManagement,
    ManagementOnly,
    ManagementAndIndividual,
}

/// User matching preferences, as stored by the profile service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: UserStatus,
    #[serde(rename = "minExperience", default)]
    pub min_experience: Option<u32>,
    #[serde(rename = "maxExperience", default)]
    pub max_experience: Option<u32>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(rename = "managementInterest", default)]
    pub management_interest: Option<ManagementInterest>,
    #[serde(rename = "managementLevel", default, deserialize_with = "null_as_empty")]
    pub management_level: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub domains: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: BTreeSet<String>,
}

impl UserPreference {
    /// Reorder swapped experience bounds and bring set-valued fields to
    /// canonical token form.
    pub fn normalized(mut self) -> Self {
        if let (Some(min), Some(max)) = (self.min_experience, self.max_experience) {
            if min > max {
                self.min_experience = Some(max);
                self.max_experience = Some(min);
            }
        }

        self.locations = canonical_set(&self.locations);
        self.domains = canonical_set(&self.domains);
        self.management_level = canonical_set(&self.management_level);
        self
    }

    /// Lower experience bound, absent meaning zero
    pub fn min_years(&self) -> u32 {
        self.min_experience.unwrap_or(0)
    }

    /// Upper experience bound, absent meaning unbounded
    pub fn max_years(&self) -> u32 {
        self.max_experience.unwrap_or(u32::MAX)
    }

    /// Management interest after the status override: only experienced
    /// users can ever be matched to leadership roles.
    pub fn effective_management_interest(&self) -> ManagementInterest {
        if self.status != UserStatus::ExperiencePosition {
            return ManagementInterest::Unspecified;
        }
        self.management_interest.unwrap_or_default()
    }
}

/// Profile documents carry `null` for list attributes that were never set
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn canonical_set(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| canonical_token(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Job posting as delivered by the job source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub title: String,
    #[serde(alias = "url", default)]
    pub source_url: String,
    #[serde(default)]
    pub locations: Option<String>,
    #[serde(default)]
    pub job_scope: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub leadership_level: Option<String>,
    /// Discrete acceptable experience levels. Sources that provide this
    /// declare the discrete encoding; everything else is parsed as a range.
    #[serde(default)]
    pub experience_levels: Option<Vec<u32>>,
}

/// Experience requirement of a job in either of the two source encodings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperienceRequirement {
    Range { min: u32, max: u32 },
    Levels { levels: BTreeSet<u32> },
}

impl ExperienceRequirement {
    /// Whether a candidate with no experience at all is acceptable
    pub fn accepts_zero(&self) -> bool {
        match self {
            ExperienceRequirement::Range { min, .. } => *min == 0,
            ExperienceRequirement::Levels { levels } => levels.contains(&0),
        }
    }

    /// Whether the requirement intersects the closed interval `[low, high]`
    pub fn overlaps(&self, low: u32, high: u32) -> bool {
        match self {
            ExperienceRequirement::Range { min, max } => low <= *max && high >= *min,
            ExperienceRequirement::Levels { levels } => levels.iter().any(|level| (low..=high).contains(level)),
        }
    }
}

/// Canonical form of a job, recomputed every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub id: String,
    pub title: String,
    pub locations: BTreeSet<String>,
    pub domains: BTreeSet<String>,
    pub experience: ExperienceRequirement,
    pub is_student_job: bool,
    pub leadership_level: Option<String>,
}

impl NormalizedJob {
    pub fn url(&self) -> &str {
        &self.id
    }
}

/// A (user, job) pair that passed every compatibility criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    #[serde(rename = "jobUrl")]
    pub job_url: String,
    #[serde(rename = "userStatus")]
    pub user_status: UserStatus,
}

impl MatchCandidate {
    pub fn pair(&self) -> PairKey {
        PairKey::new(&self.user_id, &self.job_id)
    }
}

/// Key of the notification ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub user_id: String,
    pub job_id: String,
}

impl PairKey {
    pub fn new(user_id: &str, job_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            job_id: job_id.to_string(),
        }
    }
}

/// One row of the append-only notification ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationHistoryEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "sentAt")]
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

/// Persisted match, upserted by (user_id, job_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "matchedTimestamp")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    pub fn from_candidate(candidate: &MatchCandidate, matched_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            user_id: candidate.user_id.clone(),
            job_id: candidate.job_id.clone(),
            title: candidate.job_title.clone(),
            url: candidate.job_url.clone(),
            matched_at,
        }
    }
}
