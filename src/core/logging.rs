//! Logging setup shared by the server binaries.
//!
//! All log output goes to stderr: stdout carries the protocol and must
//! never receive anything but response lines.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing with the given level, writing to stderr.
pub fn init(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
