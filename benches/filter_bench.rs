//! Benchmarks for the bateau filter engine
//!
//! Run with: cargo bench

use bateau::entity::*;
use bateau::query::*;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::collections::HashMap;

fn create_snapshot(count: usize) -> SnapshotSource {
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();

    let (containers, container_details) = (0..count)
        .map(|i| {
            let id = format!("c{:05}", i);
            let env = if i % 3 == 0 { "prod" } else { "staging" };
            let details = ContainerDetails {
                id: id.clone(),
                name: format!("/svc-{}", i),
                created: Some(now - Duration::days(i as i64 % 60)),
                state: ContainerState {
                    running: i % 2 == 0,
                    exit_code: if i % 2 == 0 { -1 } else { 0 },
                    finished_at: Some(now - Duration::hours(i as i64 % 500)),
                    ..Default::default()
                },
                config: RunConfig {
                    labels: Some(HashMap::from([("env".to_string(), env.to_string())])),
                    cmd: Some(vec!["serve".to_string()]),
                    ..Default::default()
                },
            };
            (ContainerSummary::new(id, "app:latest"), details)
        })
        .unzip();

    SnapshotSource::new(Snapshot {
        containers,
        container_details,
        ..Default::default()
    })
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let filters = [
        ("simple", "running"),
        ("label", "running & label.env=prod"),
        (
            "nested",
            "!(running | paused) & (exited>2w | label.tier~back) & name~'svc 1'",
        ),
    ];

    for (name, filter) in filters {
        group.bench_function(name, |b| {
            b.iter(|| parse_expression(black_box(filter), &CONTAINER_FIELDS).unwrap())
        });
    }

    group.bench_function("duration_literal", |b| {
        b.iter(|| parse_duration(black_box("1y 2M 3w 4d 5h 6m 7s 8ms")).unwrap())
    });

    group.bench_function("size_literal", |b| {
        b.iter(|| parse_size(black_box("1GB 512MB 12KB 7")).unwrap())
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());

    for size in [100, 1000, 10000] {
        let source = create_snapshot(size);
        group.throughput(Throughput::Elements(size as u64));

        let summary_only = Matcher::parse("id~c00 | image=none", &CONTAINER_FIELDS).unwrap();
        group.bench_function(format!("summary_only_{}", size), |b| {
            b.iter(|| scan_containers(&source, black_box(&summary_only), &clock).unwrap())
        });

        let detailed = Matcher::parse("!running & label.env=prod & exited>1w", &CONTAINER_FIELDS)
            .unwrap();
        group.bench_function(format!("detailed_{}", size), |b| {
            b.iter(|| scan_containers(&source, black_box(&detailed), &clock).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_scan);
criterion_main!(benches);
