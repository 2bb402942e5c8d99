//! Basic logger usage example
//!
//! Demonstrates JSON and text console output, level filtering and scoped
//! loggers.
//!
//! Run with: cargo run --example basic_usage

use structured_logger::prelude::*;
use structured_logger::{fields, info};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Structured Logger - Basic Usage Example ===\n");

    let ctx = LogContext::background();

    println!("1. JSON on stdout (default configuration):");
    let logger = Logger::from_config(&LoggerConfig::new().with_level(LogLevel::Debug))?;
    logger.debug(&ctx, "This is a debug message", fields! {});
    logger.info(&ctx, "request completed", fields! { "status" => 200, "path" => "/health" });
    logger.warn(&ctx, "This is a warning message", fields! { "retry" => 1 });
    let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
    logger.error(&ctx, "This is an error message", Some(&err), fields! {});

    println!("\n2. Human-readable text with colours, minimum level WARN:");
    let text = Logger::builder()
        .min_level(LogLevel::Warn)
        .handler(Arc::new(ConsoleHandler::new(
            ConsoleTarget::Stdout,
            Box::new(TextFormatter::new().with_caller(true).with_colors(true)),
        )))
        .build();
    text.info(&ctx, "Info message (hidden)", fields! {});
    text.warn(&ctx, "Warning message (visible)", fields! { "disk_free_mb" => 512 });

    println!("\n3. Scoped loggers:");
    let service = logger.with_fields(fields! { "service" => "catalog" });
    let request = service.with_fields(fields! { "request_id" => "20250108103045-a1b2c3d4" });
    request.info(&ctx, "loading product", fields! { "product_id" => 7 });
    service.info(&ctx, "cache refreshed", fields! { "entries" => 120 });
    info!(service, &ctx, "formatted message: {} items", 3);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
