//! Benchmarks for JSON extraction and validation.
//!
//! Benchmark targets:
//! - Short completion extraction: <1us
//! - Extraction behind long prose: linear in input length
//! - Extract and validate a verdict: <10us

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use phishwise::{Mode, PhishingEvaluation, extract, extract_and_validate};
use std::hint::black_box;

const SHORT: &str = r#"{"reason": "general question", "mode": "qa"}"#;
const VERDICT: &str = r#"Based on the similar emails, here is my evaluation:
{
    "reason": "The sender domain imitates the bank and the link asks for \"urgent\" verification {now}.",
    "explanation": "Banks never ask you to confirm your password through an email link.",
    "is_phishing": true
}
Let me know if you need anything else."#;

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    group.bench_function("short", |b| {
        b.iter(|| extract(black_box(SHORT)));
    });

    for prose_len in [100usize, 1_000, 10_000] {
        let raw = format!("{}{SHORT}", "lorem ipsum ".repeat(prose_len / 12));
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("leading_prose", prose_len), &raw, |b, raw| {
            b.iter(|| extract(black_box(raw)));
        });
    }

    group.finish();
}

fn bench_extract_and_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_and_validate");

    group.bench_function("mode", |b| {
        b.iter(|| extract_and_validate::<Mode>(black_box(SHORT)));
    });

    group.bench_function("phishing_verdict", |b| {
        b.iter(|| extract_and_validate::<PhishingEvaluation>(black_box(VERDICT)));
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_extract_and_validate);
criterion_main!(benches);
