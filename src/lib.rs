//! Jobmatch - recurring job-posting matcher
//!
//! Normalizes free-text job postings, matches them against user preferences
//! with four independent criteria, and throttles re-notification of the same
//! (user, job) pair with status-dependent cooldowns.

pub mod config;
pub mod core;
pub mod models;
pub mod reconciler;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{JobNormalizer, MatchStrategy, Matcher, Throttle, ThrottleDecision, Vocabulary};
pub use models::{MatchCandidate, NormalizedJob, RawJob, RunSummary, UserPreference, UserStatus};
pub use reconciler::{Reconciler, RunError};
