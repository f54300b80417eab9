//! Application glue module
//!
//! Configuration, the host loop and process-level signal handling.

mod config;
mod host;

pub use config::{default_path, Config, ConfigError};
pub use host::{install_signal_handlers, keep_running, request_stop, Host, HostError, StopReason};
