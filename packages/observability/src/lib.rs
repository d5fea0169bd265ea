//! # Observability
//!
//! Logging setup shared by every GooberCord binary.
//!
//! Crates only emit events through the standard `tracing` macros. The binary
//! calls [`init_with_config`] once at startup, which installs:
//!
//! - a JSONL file layer writing to `~/.goobercord/logs/goobercord.jsonl`
//! - an optional compact stderr layer for foreground use
//!
//! Both layers are filtered by `RUST_LOG` when set, otherwise by
//! [`LogConfig::default_level`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "goobercord".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("relay client started");
//! }
//! ```

mod file_writer;
mod json_layer;

use std::path::PathBuf;

pub use file_writer::LogFileWriter;
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every log line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.goobercord/logs/goobercord.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "goobercord".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with custom configuration.
///
/// When the log file cannot be opened the file layer is skipped and a
/// warning is emitted through whatever layers remain.
pub fn init_with_config(config: LogConfig) {
    file_writer::init_subscriber(&config);
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
