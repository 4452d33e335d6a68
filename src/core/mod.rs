//! Core infrastructure shared by every tool server.
//!
//! This module provides the wire protocol, the stdio transport, the server
//! session lifecycle, configuration, logging, and error handling.

pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::{ServerSession, SessionState};
