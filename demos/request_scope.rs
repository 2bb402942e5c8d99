//! Request-scoped logging example
//!
//! Simulates a few HTTP requests without a web framework: each request gets a
//! logger carrying its request id, and completion is logged at a level that
//! depends on the response status.
//!
//! Run with: cargo run --example request_scope

use structured_logger::fields;
use structured_logger::prelude::*;
use structured_logger::request::{log_access, AccessRecord, RequestInfo, RequestLogger};
use std::time::Duration;

fn handle(logger: &Logger, method: &str, path: &str, request_id: Option<&str>) -> u16 {
    let request = RequestLogger::begin(
        logger,
        RequestInfo {
            method: method.to_string(),
            path: path.to_string(),
            client_ip: "192.0.2.10".to_string(),
            request_id: request_id.map(str::to_string),
        },
    );

    let status = match path {
        "/health" => 200,
        "/products/404" => {
            request
                .logger()
                .warn(request.context(), "product not found", fields! { "product_id" => 404 });
            404
        }
        _ => {
            let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "database unreachable");
            request.logger().error(
                request.context(),
                "query failed",
                Some(&err),
                fields! { "table" => "products" },
            );
            500
        }
    };

    request.finish(status, 128);
    status
}

fn main() -> Result<()> {
    println!("=== Structured Logger - Request Scope Example ===\n");

    let config = LoggerConfig {
        format: "text".to_string(),
        add_stack: true,
        ..LoggerConfig::default()
    };
    let logger = Logger::from_config(&config)?;

    handle(&logger, "GET", "/health", Some("client-supplied-id"));
    handle(&logger, "GET", "/products/404", None);
    handle(&logger, "POST", "/products", None);

    println!("\nAccess log entry:");
    log_access(
        &logger,
        &LogContext::background(),
        &AccessRecord {
            method: "GET".to_string(),
            path: "/old-catalog".to_string(),
            client_ip: "192.0.2.10".to_string(),
            user_agent: "curl/8.5.0".to_string(),
            status: 301,
            latency: Duration::from_micros(850),
            ..AccessRecord::default()
        },
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
