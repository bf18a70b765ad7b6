// Criterion benchmarks for jobmatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jobmatch::core::{parse_experience, JobNormalizer, MatchStrategy, Matcher};
use jobmatch::models::{ManagementInterest, RawJob, UserPreference, UserStatus};

const LOCATIONS: &[&str] = &["Tel Aviv", "Haifa", "Jerusalem", "Remote", "Beer Sheva"];
const SCOPES: &[&str] = &["Software", "QA", "DevOps", "Data Science", "Product Management"];
const EXPERIENCE: &[&str] = &["0-1 years", "2-4", "5+ years", "3", "B.Sc required", "7–10"];

fn create_job(id: usize) -> RawJob {
    RawJob {
        title: format!("Job {}", id),
        source_url: format!("https://jobs.example/{}", id),
        locations: Some(LOCATIONS[id % LOCATIONS.len()].to_string()),
        job_scope: Some(SCOPES[id % SCOPES.len()].to_string()),
        experience_level: Some(EXPERIENCE[id % EXPERIENCE.len()].to_string()),
        leadership_level: (id % 7 == 0).then(|| "Team Lead".to_string()),
        experience_levels: None,
    }
}

fn create_user(id: usize) -> UserPreference {
    let status = match id % 3 {
        0 => UserStatus::StudentPosition,
        1 => UserStatus::NoExperiencePosition,
        _ => UserStatus::ExperiencePosition,
    };

    UserPreference {
        user_id: id.to_string(),
        status,
        min_experience: Some((id % 4) as u32),
        max_experience: Some((id % 4 + 3) as u32),
        degree: None,
        management_interest: Some(ManagementInterest::ManagementAndIndividual),
        management_level: ["team_lead".to_string()].into_iter().collect(),
        domains: [SCOPES[id % SCOPES.len()].to_string()].into_iter().collect(),
        locations: [LOCATIONS[(id + 1) % LOCATIONS.len()].to_string()].into_iter().collect(),
    }
    .normalized()
}

fn bench_parse_experience(c: &mut Criterion) {
    c.bench_function("parse_experience", |b| {
        b.iter(|| {
            for text in EXPERIENCE {
                black_box(parse_experience(black_box(text)));
            }
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = JobNormalizer::default();
    let jobs: Vec<RawJob> = (0..1000).map(create_job).collect();

    c.bench_function("normalize_1000_jobs", |b| {
        b.iter(|| {
            for job in &jobs {
                black_box(normalizer.normalize(black_box(job)));
            }
        })
    });
}

fn bench_find_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_candidates");

    for size in [100usize, 500, 2000].iter() {
        let users: Vec<UserPreference> = (0..*size).map(create_user).collect();
        let raw_jobs: Vec<RawJob> = (0..*size).map(create_job).collect();

        for strategy in [MatchStrategy::Row, MatchStrategy::Bulk] {
            let matcher = Matcher::new(JobNormalizer::default(), strategy);
            let jobs = matcher.normalize_all(&raw_jobs);

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), size),
                size,
                |b, _| b.iter(|| matcher.find_candidates(black_box(&users), black_box(&jobs))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_parse_experience, bench_normalize, bench_find_candidates);
criterion_main!(benches);
