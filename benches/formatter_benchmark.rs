//! Benchmarks for response formatting and location.
//!
//! Formatting renders a record into canonical marker text; location scans
//! the document for a prior recording. Both run once per executed request,
//! so they are measured over realistic body sizes and document shapes.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use httpbook::models::ResponseRecord;
use httpbook::respond;
use serde_json::{json, Value};

fn record_with_items(count: usize) -> ResponseRecord {
    let items: Vec<Value> = (0..count)
        .map(|i| json!({"id": i, "name": format!("item-{}", i), "active": i % 2 == 0}))
        .collect();
    ResponseRecord::success(
        "200 OK",
        34,
        Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
        json!({"items": items, "total": count}),
    )
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_record");

    for size in [1, 50, 500] {
        let record = record_with_items(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &record, |b, record| {
            b.iter(|| respond::format(black_box(record)))
        });
    }

    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    // A document where the first request's recording is followed by many
    // other requests with their own recordings; locate must find the first
    // span and stop at the second request.
    let first_request = "GET \"https://api.example.com/first\" {}";
    let mut text = format!(
        "{}\n{}",
        first_request,
        respond::format(&record_with_items(50))
    );
    for i in 0..50 {
        text.push_str(&format!(
            "\n\nGET \"https://api.example.com/{}\" {{}}\n{}",
            i,
            respond::format(&record_with_items(10))
        ));
    }
    let boundary = text.find("\n\nGET").map(|at| at + 2).unwrap_or(text.len());

    c.bench_function("locate_first_of_many", |b| {
        b.iter(|| respond::locate(black_box(&text), first_request.len(), boundary))
    });
}

fn bench_format_error(c: &mut Criterion) {
    let record = ResponseRecord::failure(
        "connection refused after 3 attempts",
        Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
    );

    c.bench_function("format_error_record", |b| {
        b.iter(|| respond::format(black_box(&record)))
    });
}

criterion_group!(benches, bench_format, bench_locate, bench_format_error);
criterion_main!(benches);
