//! Path-or-base64 input resolution.
//!
//! Tool inputs that name a file may be either a filesystem path or the
//! file's content, base64-encoded (optionally as a `data:` URI). Inline
//! content is materialized into a temp file whose lifetime is tied to the
//! returned guard, so cleanup happens on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("input is neither an existing file path nor valid base64 content")]
    Unresolvable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A local file backing one tool input. Holds the temp file guard when
/// the input was inline content.
#[derive(Debug)]
pub struct ResolvedInput {
    path: PathBuf,
    guard: Option<NamedTempFile>,
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Was this input materialized from inline content? Tools use this to
    /// decide whether results should be returned inline too.
    pub fn is_temp(&self) -> bool {
        self.guard.is_some()
    }
}

/// Resolves tool input specs into local paths.
pub struct ContentResolver;

impl ContentResolver {
    /// Resolve `spec` into a readable local file. `suffix` is used when a
    /// temp file has to be created (some collaborators sniff extensions).
    pub fn resolve_input(spec: &str, suffix: &str) -> Result<ResolvedInput, ResolveError> {
        if Path::new(spec).exists() {
            return Ok(ResolvedInput {
                path: PathBuf::from(spec),
                guard: None,
            });
        }

        // "data:<media-type>;base64,<payload>" or a bare base64 payload.
        let payload = match spec.split_once(',') {
            Some((header, payload)) if header.starts_with("data:") => payload,
            _ => spec,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| ResolveError::Unresolvable)?;

        let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        debug!(bytes = bytes.len(), path = %file.path().display(), "materialized inline input");

        Ok(ResolvedInput {
            path: file.path().to_path_buf(),
            guard: Some(file),
        })
    }

    /// Encode a produced file for inline return.
    pub fn encode_file(path: &Path) -> Result<String, ResolveError> {
        let bytes = std::fs::read(path)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn existing_path_passes_through_untouched() {
        let file = NamedTempFile::new().unwrap();
        let spec = file.path().to_string_lossy().into_owned();
        let resolved = ContentResolver::resolve_input(&spec, ".txt").unwrap();
        assert_eq!(resolved.path(), file.path());
        assert!(!resolved.is_temp());
    }

    #[test]
    fn base64_payload_lands_in_a_temp_file() {
        let spec = STANDARD.encode(b"@startuml\n@enduml\n");
        let resolved = ContentResolver::resolve_input(&spec, ".puml").unwrap();
        assert!(resolved.is_temp());
        let content = std::fs::read_to_string(resolved.path()).unwrap();
        assert!(content.contains("@startuml"));
    }

    #[test]
    fn temp_file_disappears_when_the_guard_drops() {
        let spec = STANDARD.encode(b"content");
        let resolved = ContentResolver::resolve_input(&spec, ".bin").unwrap();
        let path = resolved.path().to_path_buf();
        assert!(path.exists());
        drop(resolved);
        assert!(!path.exists());
    }

    #[test]
    fn data_uri_header_is_stripped() {
        let payload = STANDARD.encode(b"hello");
        let spec = format!("data:text/plain;base64,{payload}");
        let resolved = ContentResolver::resolve_input(&spec, ".txt").unwrap();
        assert_eq!(std::fs::read_to_string(resolved.path()).unwrap(), "hello");
    }

    #[test]
    fn garbage_input_is_unresolvable() {
        let err = ContentResolver::resolve_input("not a path and not base64!", ".txt").unwrap_err();
        assert!(matches!(err, ResolveError::Unresolvable));
    }

    #[test]
    fn encode_file_round_trips() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        let encoded = ContentResolver::encode_file(file.path()).unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"payload");
    }
}
