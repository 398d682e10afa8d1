//! Path classification: what does the user-supplied string point at?
//!
//! Never fails. Anything that cannot be looked up cleanly degrades to
//! [`PathClassification::Invalid`].

use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// The nature of a filesystem path at the moment it was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathClassification {
    File,
    Directory,
    NotExist,
    Invalid,
}

impl fmt::Display for PathClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathClassification::File => "file",
            PathClassification::Directory => "directory",
            PathClassification::NotExist => "not-exist",
            PathClassification::Invalid => "invalid",
        })
    }
}

/// Classify `input` as a file, directory, missing path, or invalid string.
///
/// Symlinks are followed. Empty strings and strings containing NUL are
/// invalid; so are paths that exist but are neither a regular file nor a
/// directory (FIFOs, sockets, devices).
pub fn classify_path(input: &str) -> PathClassification {
    if input.trim().is_empty() || input.contains('\0') {
        return PathClassification::Invalid;
    }

    match std::fs::metadata(Path::new(input)) {
        Ok(meta) if meta.is_file() => PathClassification::File,
        Ok(meta) if meta.is_dir() => PathClassification::Directory,
        Ok(_) => {
            debug!("'{}' is neither a regular file nor a directory", input);
            PathClassification::Invalid
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            PathClassification::NotExist
        }
        Err(e) => {
            debug!("Cannot inspect '{}': {}", input, e);
            PathClassification::Invalid
        }
    }
}

/// Why `input` classified as [`PathClassification::Invalid`].
pub fn invalid_reason(input: &str) -> &'static str {
    if input.trim().is_empty() {
        "the path is empty"
    } else if input.contains('\0') {
        "the path contains a NUL byte"
    } else {
        "not a regular file or directory, or not accessible"
    }
}
