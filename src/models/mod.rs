// Model exports
pub mod domain;
pub mod responses;

pub use domain::{
    ExperienceRequirement, ManagementInterest, MatchCandidate, MatchRecord, NormalizedJob,
    NotificationHistoryEntry, PairKey, RawJob, UserPreference, UserStatus,
};
pub use responses::{ErrorResponse, HealthResponse, RunStatus, RunSummary};
