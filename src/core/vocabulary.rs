use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::normalizer::canonical_token;

/// A canonical domain id and the human-readable title job sources use for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub id: String,
    pub title: String,
}

impl DomainEntry {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
        }
    }
}

/// Shared vocabulary between job postings and user preferences
///
/// Domain scopes resolve when their canonical form equals the canonical form
/// of an entry's title or id. There is no partial or fuzzy matching; anything
/// else is dropped. Leadership tokens are only checked when a leadership
/// vocabulary is configured.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    domains: HashMap<String, String>,
    leadership: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<I, L>(domains: I, leadership: L) -> Self
    where
        I: IntoIterator<Item = DomainEntry>,
        L: IntoIterator<Item = String>,
    {
        let mut lookup = HashMap::new();
        for entry in domains {
            let id = canonical_token(&entry.id);
            if id.is_empty() {
                continue;
            }
            lookup.insert(canonical_token(&entry.title), id.clone());
            lookup.insert(id.clone(), id);
        }

        Self {
            domains: lookup,
            leadership: leadership
                .into_iter()
                .map(|l| canonical_token(&l))
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    /// Vocabulary used when configuration does not provide one
    pub fn builtin() -> Self {
        Self::new(default_domains(), Vec::new())
    }

    /// Resolve a raw scope token to a canonical domain id
    pub fn resolve_domain(&self, raw: &str) -> Option<&str> {
        self.domains.get(&canonical_token(raw)).map(String::as_str)
    }

    /// Filter a canonical leadership token through the leadership vocabulary
    pub fn resolve_leadership(&self, token: String) -> Option<String> {
        if token.is_empty() {
            return None;
        }
        if self.leadership.is_empty() || self.leadership.contains(&token) {
            Some(token)
        } else {
            None
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.values().collect::<BTreeSet<_>>().len()
    }
}

pub fn default_domains() -> Vec<DomainEntry> {
    vec![
        DomainEntry::new("software", "Software"),
        DomainEntry::new("data_science", "Data Science"),
        DomainEntry::new("devops", "DevOps"),
        DomainEntry::new("qa", "QA"),
        DomainEntry::new("cyber_security", "Cyber Security"),
        DomainEntry::new("hardware", "Hardware"),
        DomainEntry::new("product", "Product Management"),
        DomainEntry::new("design", "UI/UX Design"),
        DomainEntry::new("it", "IT"),
        DomainEntry::new("sales", "Sales"),
        DomainEntry::new("marketing", "Marketing"),
    ]
}
