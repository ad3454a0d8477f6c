//! Benchmarks for the grammar parser and request extractor.
//!
//! These benchmarks measure tree building and extraction over synthetic
//! blocks of various sizes, so parsing stays comfortably interactive even
//! for blocks holding hundreds of requests.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use httpbook::extract::extract_all;
use httpbook::syntax::SyntaxTree;

/// Generate a synthetic block with the specified number of requests.
fn generate_block(num_requests: usize) -> String {
    let mut content = String::from("@var {\n  base: \"https://api.example.com\"\n  token: \"t-0\"\n}\n\n");

    for i in 0..num_requests {
        content.push_str(&format!(
            "GET \"{{{{base}}}}/users/{}\" {{\n  authorization: \"Bearer {{{{token}}}}\"\n  accept: \"application/json\"\n  x_request_id: {}\n}}\n\n",
            i, i
        ));
    }

    content
}

/// Generate a block mixing request shapes: bodies, nested objects, and
/// recorded responses between requests.
fn generate_complex_block(num_requests: usize) -> String {
    let mut content = String::new();

    for i in 0..num_requests {
        match i % 3 {
            0 => content.push_str(&format!(
                "POST \"https://api.example.com/resource/{}\" {{\n  content_type: \"application/json\"\n  @json {{\n    id: {}\n    name: \"Resource {}\"\n    meta: {{ version: {} }}\n  }}\n}}\n\n",
                i, i, i, i
            )),
            1 => content.push_str(&format!(
                "GET \"https://api.example.com/resource/{}\" {{}}\n#[response] 200 OK | 4 ms | 2026-08-06T10:30:00Z\n{{\n  \"id\": {}\n}}\n#[/response]\n\n",
                i, i
            )),
            _ => content.push_str(&format!(
                "DELETE \"https://api.example.com/resource/{}\" {{ force: true }}\n\n",
                i
            )),
        }
    }

    content
}

fn bench_parse_small(c: &mut Criterion) {
    let content = generate_block(10);

    c.bench_function("parse_small_10_requests", |b| {
        b.iter(|| SyntaxTree::parse(black_box(&content)))
    });
}

fn bench_parse_medium(c: &mut Criterion) {
    let content = generate_block(100);

    c.bench_function("parse_medium_100_requests", |b| {
        b.iter(|| SyntaxTree::parse(black_box(&content)))
    });
}

fn bench_parse_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_complex");

    for size in [10, 100, 500] {
        let content = generate_complex_block(size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| SyntaxTree::parse(black_box(content)))
        });
    }

    group.finish();
}

fn bench_extract_all(c: &mut Criterion) {
    let content = generate_block(100);
    let tree = SyntaxTree::parse(&content);

    c.bench_function("extract_all_100_requests", |b| {
        b.iter(|| extract_all(black_box(&tree), black_box(&content)))
    });
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_medium,
    bench_parse_complex,
    bench_extract_all
);
criterion_main!(benches);
