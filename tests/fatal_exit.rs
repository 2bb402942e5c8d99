//! `Logger::fatal` terminates the process after writing
//!
//! The test re-runs its own binary with an environment variable set; the
//! child logs at Fatal and must exit with status 1.

use structured_logger::{fields, LogContext, LogLevel, Logger, LoggerConfig};
use std::process::Command;

const CHILD_ENV: &str = "STRUCTURED_LOGGER_FATAL_CHILD";

#[test]
fn test_fatal_exits_with_status_one() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let logger = Logger::from_config(
            &LoggerConfig::new()
                .with_level(LogLevel::Error)
                .with_output("stdout"),
        )
        .expect("stdout logger");
        let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port 8080 in use");
        logger.fatal(
            &LogContext::background(),
            "cannot start server",
            Some(&err),
            fields! { "port" => 8080 },
        );
    }

    let exe = std::env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args(["test_fatal_exits_with_status_one", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("spawn child test process");

    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    // libtest's own progress text may precede the record on the same line
    let record = stdout
        .lines()
        .find_map(|line| line.find("{\"").map(|start| &line[start..]))
        .expect("fatal entry on stdout");
    let parsed: serde_json::Value = serde_json::from_str(record).expect("json line");
    assert_eq!(parsed["level"], "FATAL");
    assert_eq!(parsed["message"], "cannot start server");
    assert_eq!(parsed["error"], "port 8080 in use");
    assert_eq!(parsed["port"], 8080);
}
