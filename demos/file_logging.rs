//! File logging example
//!
//! Writes JSON lines to a rotating file with a deliberately small size limit
//! so that rotation, compression and pruning can be observed.
//!
//! Run with: cargo run --example file_logging

use structured_logger::fields;
use structured_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Structured Logger - File Logging Example ===\n");

    let log_path = std::env::temp_dir().join("structured_logger_demo").join("app.log");

    let policy = RotationPolicy::new()
        .with_max_size(4 * 1024)
        .with_max_backups(3)
        .with_max_age_days(7)
        .with_compression(true);
    let handler = Arc::new(FileHandler::new(
        &log_path,
        policy,
        Box::new(JsonFormatter::new().with_caller(true)),
    )?);

    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .handler(handler.clone())
        .build();
    let ctx = LogContext::background();

    for i in 0..200 {
        logger.info(
            &ctx,
            "order processed",
            fields! { "order_id" => i, "amount_cents" => 1999, "currency" => "EUR" },
        );
    }

    handler.wait_for_maintenance();
    println!("Active file: {}", log_path.display());
    for backup in handler.backups()? {
        println!("Backup:      {}", backup.display());
    }

    logger.close()?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
