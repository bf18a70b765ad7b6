use std::collections::BTreeSet;

use crate::core::experience::parse_experience;
use crate::core::vocabulary::Vocabulary;
use crate::models::{ExperienceRequirement, NormalizedJob, RawJob};

/// Canonical token form: trimmed, lowercased, whitespace runs collapsed to `_`
///
/// Idempotent: `canonical_token(&canonical_token(s)) == canonical_token(s)`.
#[inline]
pub fn canonical_token(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Split a comma-separated field into canonical tokens, dropping empties
pub fn split_tokens(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(canonical_token)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Stable job identifier derived from its URL
pub fn canonical_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Turns raw postings into their canonical form
///
/// Normalization is total: every malformed or missing field falls back to
/// its documented default.
#[derive(Debug, Clone)]
pub struct JobNormalizer {
    vocabulary: Vocabulary,
}

impl Default for JobNormalizer {
    fn default() -> Self {
        Self::new(Vocabulary::builtin())
    }
}

impl JobNormalizer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn normalize(&self, raw: &RawJob) -> NormalizedJob {
        let experience_text = raw.experience_level.as_deref().unwrap_or_default();
        let parsed = parse_experience(experience_text);

        let experience = match &raw.experience_levels {
            Some(levels) if !levels.is_empty() => ExperienceRequirement::Levels {
                levels: levels.iter().copied().collect(),
            },
            _ => ExperienceRequirement::Range {
                min: parsed.min,
                max: parsed.max,
            },
        };

        let leadership_level = raw
            .leadership_level
            .as_deref()
            .map(canonical_token)
            .and_then(|token| self.vocabulary.resolve_leadership(token));

        NormalizedJob {
            id: canonical_url(&raw.source_url),
            title: raw.title.trim().to_string(),
            locations: split_tokens(raw.locations.as_deref()),
            domains: self.resolve_domains(raw.job_scope.as_deref()),
            experience,
            is_student_job: parsed.degree_required,
            leadership_level,
        }
    }

    fn resolve_domains(&self, scope: Option<&str>) -> BTreeSet<String> {
        scope
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                let resolved = self.vocabulary.resolve_domain(token);
                if resolved.is_none() {
                    tracing::trace!("Dropping unresolved job scope: {}", token);
                }
                resolved.map(str::to_string)
            })
            .collect()
    }
}
