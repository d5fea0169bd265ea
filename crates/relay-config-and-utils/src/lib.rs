//! Configuration, paths and logging setup for the GooberCord relay client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_LOCAL_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_RECONNECT_BASE_DELAY_MS,
    DEFAULT_RECONNECT_MAX_DELAY_MS, DEFAULT_SERVER_URL, DEFAULT_SESSION_SERVER_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
