//! Bounded stack capture for error entries
//!
//! Built on `std::backtrace::Backtrace`. Frames belonging to the capture
//! machinery and to the logging engine are dropped so the first frame
//! reported is the caller of the log method.

use std::backtrace::Backtrace;
use std::fmt;

/// Default number of frames kept for an error entry
pub const DEFAULT_STACK_DEPTH: usize = 10;

const STACK_MODULE: &str = module_path!();

/// One resolved frame of a captured backtrace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{} {}", file, line, self.function),
            (Some(file), None) => write!(f, "{} {}", file, self.function),
            _ => f.write_str(&self.function),
        }
    }
}

/// Capture the current stack as at most `max_depth` `file:line function` strings.
///
/// Every frame up to and including the last one whose function path contains
/// one of `engine_paths` (or this module) is skipped.
pub fn capture(max_depth: usize, engine_paths: &[&str]) -> Vec<String> {
    let rendered = Backtrace::force_capture().to_string();
    select_frames(parse_frames(&rendered), max_depth, engine_paths)
        .iter()
        .map(Frame::to_string)
        .collect()
}

/// Parse the textual rendering of a `std::backtrace::Backtrace`.
pub fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    let (file, line) = split_location(location);
                    frame.file = Some(file);
                    frame.line = line;
                }
            }
            continue;
        }

        let Some((index, function)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        frames.push(Frame {
            function: function.trim().to_string(),
            file: None,
            line: None,
        });
    }

    frames
}

fn select_frames(frames: Vec<Frame>, max_depth: usize, engine_paths: &[&str]) -> Vec<Frame> {
    let is_engine = |frame: &Frame| {
        frame.function.contains(STACK_MODULE)
            || engine_paths.iter().any(|path| frame.function.contains(path))
    };

    let start = match frames.iter().rposition(is_engine) {
        Some(last_engine) => last_engine + 1,
        None => frames
            .iter()
            .position(|frame| !frame.function.starts_with("std::backtrace"))
            .unwrap_or(frames.len()),
    };

    frames.into_iter().skip(start).take(max_depth).collect()
}

// `/path/to/file.rs:116:5` -> (`file.rs`, Some(116))
fn split_location(location: &str) -> (String, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().unwrap_or_default();
    let middle = parts.next();
    let rest = parts.next();

    let (path, line) = match (rest, middle) {
        (Some(path), Some(line)) if line.parse::<u32>().is_ok() => (path, line.parse().ok()),
        _ => match middle {
            Some(path) if last.parse::<u32>().is_ok() => (path, last.parse().ok()),
            _ => (location, None),
        },
    };

    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    (base.to_string(), line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:13
   1: structured_logger::core::stack::capture
             at ./src/core/stack.rs:40:20
   2: structured_logger::core::logger::Logger::log
             at ./src/core/logger.rs:210:25
   3: structured_logger::core::logger::Logger::error
             at ./src/core/logger.rs:150:9
   4: app::handlers::create_product
             at ./src/handlers.rs:88:13
   5: app::main
             at ./src/main.rs:12:5
   6: core::ops::function::FnOnce::call_once
";

    #[test]
    fn test_parse_frames() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[4].function, "app::handlers::create_product");
        assert_eq!(frames[4].file.as_deref(), Some("handlers.rs"));
        assert_eq!(frames[4].line, Some(88));
        assert_eq!(frames[6].file, None);
    }

    #[test]
    fn test_engine_frames_are_skipped() {
        let frames = select_frames(
            parse_frames(SAMPLE),
            DEFAULT_STACK_DEPTH,
            &["structured_logger::core::logger::Logger"],
        );
        let rendered: Vec<String> = frames.iter().map(Frame::to_string).collect();
        assert_eq!(
            rendered,
            [
                "handlers.rs:88 app::handlers::create_product",
                "main.rs:12 app::main",
                "core::ops::function::FnOnce::call_once",
            ]
        );
    }

    #[test]
    fn test_depth_is_bounded() {
        let frames = select_frames(parse_frames(SAMPLE), 1, &["core::logger::Logger"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].function, "app::handlers::create_product");
    }

    #[test]
    fn test_split_location() {
        assert_eq!(
            split_location("/a/b/c.rs:10:5"),
            ("c.rs".to_string(), Some(10))
        );
        assert_eq!(split_location("c.rs:7"), ("c.rs".to_string(), Some(7)));
        assert_eq!(split_location("unknown"), ("unknown".to_string(), None));
    }

    #[test]
    fn test_capture_respects_depth() {
        let frames = capture(3, &[]);
        assert!(frames.len() <= 3);
    }
}
