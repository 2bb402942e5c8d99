//! Criterion benchmarks for structured_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use structured_logger::fields;
use structured_logger::prelude::*;
use std::sync::Arc;

fn sink_logger(level: LogLevel, formatter: Box<dyn Formatter>) -> Logger {
    Logger::builder()
        .min_level(level)
        .handler(Arc::new(ConsoleHandler::with_writer(
            Box::new(std::io::sink()),
            formatter,
        )))
        .build()
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let ctx = LogContext::background().with_request_id("20250108103045-a1b2c3d4");
    let json = sink_logger(LogLevel::Debug, Box::new(JsonFormatter::new()));
    let text = sink_logger(LogLevel::Debug, Box::new(TextFormatter::new()));

    group.bench_function("json_info", |b| {
        b.iter(|| {
            json.info(
                &ctx,
                black_box("request completed"),
                fields! { "status" => 200, "path" => "/health" },
            );
        });
    });

    group.bench_function("text_info", |b| {
        b.iter(|| {
            text.info(
                &ctx,
                black_box("request completed"),
                fields! { "status" => 200, "path" => "/health" },
            );
        });
    });

    let scoped = json.with_fields(fields! {
        "service" => "catalog",
        "version" => "1.4.2",
        "region" => "eu-west-1",
    });
    group.bench_function("json_scoped_info", |b| {
        b.iter(|| {
            scoped.info(&ctx, black_box("request completed"), fields! { "status" => 200 });
        });
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = sink_logger(LogLevel::Info, Box::new(JsonFormatter::new()));

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    std::thread::spawn(move || {
                        let ctx = LogContext::background();
                        logger.info(&ctx, black_box("Concurrent message"), Fields::new());
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Derivation Benchmarks
// ============================================================================

fn bench_with_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_fields");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Info, Box::new(JsonFormatter::new()));
    let base = logger.with_fields(fields! { "service" => "catalog", "env" => "prod" });

    group.bench_function("derive", |b| {
        b.iter(|| black_box(base.with_fields(fields! { "request_id" => "abc-123" })));
    });

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(LogLevel::Info, "Test message")
        .with_fields(fields! { "status" => 200, "path" => "/health", "latency" => "1.2ms" })
        .with_location("server.rs", 42);
    let json = JsonFormatter::new().with_caller(true);
    let text = TextFormatter::new().with_caller(true);

    group.bench_function("json", |b| {
        b.iter(|| black_box(json.format(black_box(&entry)).unwrap()));
    });

    group.bench_function("text", |b| {
        b.iter(|| black_box(text.format(black_box(&entry)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Warn, Box::new(JsonFormatter::new()));
    let ctx = LogContext::background();

    group.bench_function("below_threshold", |b| {
        b.iter(|| {
            logger.debug(&ctx, black_box("This should be filtered"), Fields::new());
        });
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| {
            logger.error(&ctx, black_box("This should be logged"), None, Fields::new());
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_logging,
    bench_concurrent_logging,
    bench_with_fields,
    bench_formatters,
    bench_level_filtering
);

criterion_main!(benches);
