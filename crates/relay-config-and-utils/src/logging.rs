//! Logging initialization.
//!
//! Thin wrapper over the observability crate so binaries only pass a level
//! and the runtime paths.

use crate::Paths;
use observability::LogConfig;

/// Initialize structured logging for the relay client.
///
/// Writes JSONL to `<base_dir>/logs/goobercord.jsonl`. `RUST_LOG` takes
/// precedence over `level`. With `also_stderr` the compact human format is
/// mirrored to stderr.
pub fn init_logging(level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: "goobercord".into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level, defaulting to INFO.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
