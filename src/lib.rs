//! Shared runtime for stdio tool servers.
//!
//! Each binary in this repository is a thin wrapper around one external
//! collaborator (a Docker-hosted renderer, the Mermaid Chart API, the
//! `yt-dlp` executable, a document template engine). What they share is the
//! protocol runtime in this crate:
//!
//! - **core**: wire protocol, line-delimited stdio framing, the server
//!   session state machine, configuration and logging
//! - **domains::tools**: the tool registry with declared input schemas,
//!   the dispatcher that validates and invokes handlers, and the tool
//!   definitions themselves (one file per tool)
//! - **services**: the external collaborators the tools delegate to
//!
//! A server registers its tools into a [`domains::tools::ToolRegistry`],
//! hands the registry to a [`core::ServerSession`], and runs the session
//! over stdin/stdout until the input stream closes.

pub mod core;
pub mod domains;
pub mod services;

pub use crate::core::{Config, Error, Result, ServerSession};
