// Unit tests for jobmatch

use chrono::{TimeZone, Utc};
use jobmatch::core::experience::{ExperiencePattern, UNBOUNDED_EXP};
use jobmatch::core::{
    matches_domain, matches_experience, matches_leadership, matches_location, parse_experience,
    split_tokens, JobNormalizer, Throttle, Vocabulary,
};
use jobmatch::models::{
    ExperienceRequirement, ManagementInterest, NormalizedJob, RawJob, UserPreference, UserStatus,
};
use std::collections::BTreeSet;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn create_user(status: UserStatus) -> UserPreference {
    UserPreference {
        user_id: "user_1".to_string(),
        status,
        min_experience: None,
        max_experience: None,
        degree: None,
        management_interest: None,
        management_level: BTreeSet::new(),
        domains: BTreeSet::new(),
        locations: BTreeSet::new(),
    }
}

fn create_job(min: u32, max: u32) -> NormalizedJob {
    NormalizedJob {
        id: "https://jobs.example/1".to_string(),
        title: "Engineer".to_string(),
        locations: BTreeSet::new(),
        domains: BTreeSet::new(),
        experience: ExperienceRequirement::Range { min, max },
        is_student_job: false,
        leadership_level: None,
    }
}

#[test]
fn test_parse_range_with_unicode_dash() {
    let parsed = parse_experience("2–4 שנות ניסיון");
    assert_eq!((parsed.min, parsed.max), (2, 4));
    assert_eq!(parsed.pattern, ExperiencePattern::Range);
}

#[test]
fn test_parse_at_least() {
    let parsed = parse_experience("5+ years");
    assert_eq!((parsed.min, parsed.max), (5, UNBOUNDED_EXP));
    assert_eq!(parsed.pattern, ExperiencePattern::AtLeast);
}

#[test]
fn test_parse_single_number() {
    let parsed = parse_experience("at least 3 years");
    assert_eq!((parsed.min, parsed.max), (3, 3));
}

#[test]
fn test_parse_unparseable_defaults() {
    let parsed = parse_experience("senior, lots of it");
    assert_eq!((parsed.min, parsed.max), (0, UNBOUNDED_EXP));
    assert!(!parsed.degree_required);
}

#[test]
fn test_parse_degree_does_not_short_circuit_numbers() {
    let parsed = parse_experience("B.Sc in CS, 1-2 years");
    assert!(parsed.degree_required);
    assert_eq!((parsed.min, parsed.max), (1, 2));
}

#[test]
fn test_parse_reversed_range_is_reordered() {
    let parsed = parse_experience("5-2");
    assert_eq!((parsed.min, parsed.max), (2, 5));
}

#[test]
fn test_split_tokens_canonical_form() {
    assert_eq!(split_tokens(Some("Tel Aviv, Remote")), set(&["tel_aviv", "remote"]));
    assert_eq!(split_tokens(Some(" , ,")), BTreeSet::new());
    assert_eq!(split_tokens(None), BTreeSet::new());
}

#[test]
fn test_normalizer_resolves_domain_titles() {
    let normalizer = JobNormalizer::default();
    let job = normalizer.normalize(&RawJob {
        title: "Analyst".to_string(),
        source_url: "https://jobs.example/analyst/".to_string(),
        job_scope: Some("Data Science, Basket Weaving".to_string()),
        ..RawJob::default()
    });

    assert_eq!(job.id, "https://jobs.example/analyst");
    assert_eq!(job.domains, set(&["data_science"]));
}

#[test]
fn test_normalizer_rejects_unknown_leadership_with_closed_vocabulary() {
    let vocabulary = Vocabulary::new(Vec::new(), vec!["team_lead".to_string()]);
    let normalizer = JobNormalizer::new(vocabulary);

    let known = normalizer.normalize(&RawJob {
        leadership_level: Some("Team Lead".to_string()),
        ..RawJob::default()
    });
    let unknown = normalizer.normalize(&RawJob {
        leadership_level: Some("Overlord".to_string()),
        ..RawJob::default()
    });

    assert_eq!(known.leadership_level.as_deref(), Some("team_lead"));
    assert_eq!(unknown.leadership_level, None);
}

#[test]
fn test_experience_overlap_cases() {
    let mut user = create_user(UserStatus::ExperiencePosition);
    user.min_experience = Some(2);
    user.max_experience = Some(5);

    assert!(matches_experience(&user, &create_job(0, 3)));
    assert!(matches_experience(&user, &create_job(4, 6)));
    assert!(!matches_experience(&user, &create_job(6, 10)));
}

#[test]
fn test_experience_absent_bounds_are_open() {
    let user = create_user(UserStatus::ExperiencePosition);
    assert!(matches_experience(&user, &create_job(0, 0)));
    assert!(matches_experience(&user, &create_job(40, UNBOUNDED_EXP)));
}

#[test]
fn test_no_experience_requires_zero_minimum() {
    let user = create_user(UserStatus::NoExperiencePosition);
    assert!(matches_experience(&user, &create_job(0, 2)));
    assert!(!matches_experience(&user, &create_job(1, 2)));

    let mut discrete = create_job(0, 0);
    discrete.experience = ExperienceRequirement::Levels { levels: [0, 1].into_iter().collect() };
    assert!(matches_experience(&user, &discrete));
}

#[test]
fn test_student_requires_student_job() {
    let user = create_user(UserStatus::StudentPosition);
    let mut job = create_job(0, 0);
    assert!(!matches_experience(&user, &job));

    job.is_student_job = true;
    assert!(matches_experience(&user, &job));
}

#[test]
fn test_domain_open_on_either_side() {
    let mut user = create_user(UserStatus::NoExperiencePosition);
    let mut job = create_job(0, 0);
    assert!(matches_domain(&user, &job));

    user.domains = set(&["software"]);
    assert!(matches_domain(&user, &job));

    job.domains = set(&["qa"]);
    assert!(!matches_domain(&user, &job));

    job.domains.insert("software".to_string());
    assert!(matches_domain(&user, &job));
}

#[test]
fn test_remote_wildcard() {
    let mut user = create_user(UserStatus::NoExperiencePosition);
    let mut job = create_job(0, 0);

    user.locations = set(&["haifa"]);
    job.locations = set(&["tel_aviv"]);
    assert!(!matches_location(&user, &job));

    job.locations.insert("remote".to_string());
    assert!(matches_location(&user, &job));

    job.locations = set(&["tel_aviv"]);
    user.locations.insert("remote".to_string());
    assert!(matches_location(&user, &job));
}

#[test]
fn test_leadership_policy_table() {
    let mut job_with_level = create_job(0, 0);
    job_with_level.leadership_level = Some("team_lead".to_string());
    let job_without_level = create_job(0, 0);

    // (interest, accepts job with a wanted level, accepts job without level)
    let table = [
        (ManagementInterest::Unspecified, false, true),
        (ManagementInterest::NoManagement, false, true),
        (ManagementInterest::ManagementOnly, true, false),
        (ManagementInterest::ManagementAndIndividual, true, true),
    ];

    for (interest, with_level, without_level) in table {
        let mut user = create_user(UserStatus::ExperiencePosition);
        user.management_interest = Some(interest);
        user.management_level = set(&["team_lead"]);

        assert_eq!(matches_leadership(&user, &job_with_level), with_level, "{:?}", interest);
        assert_eq!(matches_leadership(&user, &job_without_level), without_level, "{:?}", interest);
    }
}

#[test]
fn test_leadership_level_must_be_wanted() {
    let mut job = create_job(0, 0);
    job.leadership_level = Some("director".to_string());

    let mut user = create_user(UserStatus::ExperiencePosition);
    user.management_interest = Some(ManagementInterest::ManagementAndIndividual);
    user.management_level = set(&["team_lead"]);

    assert!(!matches_leadership(&user, &job));
}

#[test]
fn test_leadership_interest_forced_absent_for_non_experienced() {
    let mut job = create_job(0, 0);
    job.leadership_level = Some("team_lead".to_string());

    for status in [UserStatus::StudentPosition, UserStatus::NoExperiencePosition] {
        let mut user = create_user(status);
        user.management_interest = Some(ManagementInterest::ManagementOnly);
        user.management_level = set(&["team_lead"]);

        assert!(!matches_leadership(&user, &job));
        assert!(matches_leadership(&user, &create_job(0, 0)));
    }
}

#[test]
fn test_throttle_boundaries() {
    let throttle = Throttle::default();
    let sent = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let days = |n: i64| sent + chrono::Duration::days(n);

    assert!(!throttle.should_notify(UserStatus::StudentPosition, Some(sent), days(3)));
    assert!(throttle.should_notify(UserStatus::StudentPosition, Some(sent), days(4)));
    assert!(!throttle.should_notify(UserStatus::NoExperiencePosition, Some(sent), days(14)));
    assert!(throttle.should_notify(UserStatus::NoExperiencePosition, Some(sent), days(15)));
    assert!(!throttle.should_notify(UserStatus::ExperiencePosition, Some(sent), days(14)));
    assert!(throttle.should_notify(UserStatus::ExperiencePosition, Some(sent), days(15)));
}

#[test]
fn test_throttle_first_contact_always_notifies() {
    let throttle = Throttle::default();
    assert!(throttle.should_notify(UserStatus::ExperiencePosition, None, Utc::now()));
}
