// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use screener_app::{DetailResponse, ResultRow, ResultSet};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::macros::datetime;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "mail.example",
    "jobseeker.io",
    "resume.dev",
    "inbox.test",
];
const ROLES: [&str; 10] = [
    "backend engineer",
    "data analyst",
    "frontend developer",
    "machine learning engineer",
    "site reliability engineer",
    "product designer",
    "QA engineer",
    "mobile developer",
    "data engineer",
    "technical writer",
];
const SKILLS: [&str; 24] = [
    "python",
    "flask",
    "sql",
    "rust",
    "docker",
    "kubernetes",
    "pandas",
    "scikit-learn",
    "react",
    "typescript",
    "aws",
    "terraform",
    "postgres",
    "redis",
    "spark",
    "airflow",
    "grpc",
    "linux",
    "git",
    "ci/cd",
    "tableau",
    "excel",
    "figma",
    "testing",
];
const JOB_DESCRIPTIONS: [&str; 4] = [
    "senior_python_developer.pdf",
    "data_scientist.pdf",
    "platform_engineer.pdf",
    "ui_engineer.pdf",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.int_n(100) < percent
    }
}

/// Seeded generator for screening output and matching detail payloads.
#[derive(Debug, Clone)]
pub struct ResumeFaker {
    rng: DeterministicRng,
}

impl ResumeFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Rows sorted by score, highest first, as the ranking step emits them.
    pub fn ranked_results(&mut self, count: usize) -> Vec<ResultRow> {
        let mut rows = (0..count)
            .map(|index| {
                let first = self.pick(&FIRST_NAMES);
                let last = self.pick(&LAST_NAMES);
                let display_name = self.rng.chance(80).then(|| format!("{first} {last}"));
                ResultRow {
                    filename: format!(
                        "{}_{}_{:02}.pdf",
                        first.to_ascii_lowercase(),
                        last.to_ascii_lowercase(),
                        index + 1
                    ),
                    score: (self.rng.unit() * 10_000.0).round() / 10_000.0,
                    display_name,
                }
            })
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| right.score.total_cmp(&left.score));
        rows
    }

    pub fn result_set(&mut self, count: usize) -> ResultSet {
        ResultSet {
            job_description: Some(self.pick(&JOB_DESCRIPTIONS).to_owned()),
            generated_at: Some(fixture_generated_at()),
            results: self.ranked_results(count),
        }
    }

    /// Detail payload for `row`. Contact fields are dropped at random so
    /// callers see the partial responses the real endpoint produces.
    pub fn detail_for(&mut self, row: &ResultRow) -> DetailResponse {
        let (first, last) = split_name(row);
        let domain = self.pick(&EMAIL_DOMAINS);
        let email = self
            .rng
            .chance(75)
            .then(|| format!("{first}.{last}@{domain}"));
        let phone = self.rng.chance(60).then(|| {
            format!(
                "({:03}) {:03}-{:04}",
                200 + self.rng.int_n(800),
                200 + self.rng.int_n(800),
                self.rng.int_n(10_000),
            )
        });
        let linkedin = self.rng.chance(50).then(|| {
            if self.rng.chance(50) {
                format!("linkedin.com/in/{first}-{last}")
            } else {
                format!("https://www.linkedin.com/in/{first}{last}")
            }
        });
        let text = self.rng.chance(90).then(|| self.summary());

        DetailResponse {
            ok: true,
            error: None,
            filename: Some(row.filename.clone()),
            email,
            phone,
            linkedin,
            text,
        }
    }

    fn summary(&mut self) -> String {
        let role = self.pick(&ROLES);
        let years = 1 + self.rng.int_n(15);
        let skill_count = 3 + self.rng.int_n(4);
        let skills = (0..skill_count)
            .map(|_| self.pick(&SKILLS))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{years} years as a {role}. Skills: {skills}.")
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

fn split_name(row: &ResultRow) -> (String, String) {
    let stem = row.filename.trim_end_matches(".pdf");
    let mut parts = stem.split('_');
    let first = parts.next().unwrap_or("candidate").to_owned();
    let last = parts.next().unwrap_or("resume").to_owned();
    (first, last)
}

pub fn not_found_response() -> DetailResponse {
    DetailResponse {
        ok: false,
        error: Some("not found".to_owned()),
        ..DetailResponse::default()
    }
}

pub fn fixture_generated_at() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56 UTC)
}

/// Writes `set` as a results file inside a fresh temp dir.
pub fn write_results_file(set: &ResultSet) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("results.json");
    let raw = serde_json::to_string_pretty(set).context("encode result set")?;
    std::fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}
