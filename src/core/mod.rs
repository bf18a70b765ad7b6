// Core algorithm exports
pub(crate) mod bulk;
pub mod criteria;
pub mod experience;
pub mod matcher;
pub mod normalizer;
pub mod throttle;
pub mod vocabulary;

pub use criteria::{matches_domain, matches_experience, matches_leadership, matches_location, Criterion};
pub use experience::{parse_experience, ParsedExperience};
pub use matcher::{first_failure, MatchResult, MatchStrategy, Matcher};
pub use normalizer::{canonical_token, split_tokens, JobNormalizer};
pub use throttle::{Throttle, ThrottleDecision};
pub use vocabulary::{DomainEntry, Vocabulary};
