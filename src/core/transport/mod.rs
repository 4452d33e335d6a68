//! Transport layer: line-delimited JSON framing over stdin/stdout.
//!
//! The transport is generic over its byte streams so the full session loop
//! can be exercised against in-memory buffers in tests.

mod error;
mod stdio;

pub use error::{TransportError, TransportResult};
pub use stdio::StdioTransport;
