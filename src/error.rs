//! Error types for directory scanning and sequence queries.

use std::path::PathBuf;

/// Scan and query errors.
///
/// Everything is reported synchronously to the caller of the failing
/// operation; there is no transient-failure class here (local filesystem
/// reads only, no retries).
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// Path does not exist or is not a directory.
    DirectoryNotFound(PathBuf),
    /// Explicit pattern is malformed (zero or multiple placeholders, or
    /// the generated expression failed to compile).
    InvalidPattern(String),
    /// A candidate group held several files with the same frame number;
    /// the bucket was excluded instead of silently merged.
    AmbiguousGroup {
        prefix: String,
        postfix: String,
        value: i64,
    },
    /// Query against a group index outside `[0, num_groups())`.
    GroupIndexOutOfRange { index: usize, count: usize },
    /// Directory entry could not be read.
    Io(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::DirectoryNotFound(p) => {
                write!(f, "Directory not found: {}", p.display())
            }
            ScanError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
            ScanError::AmbiguousGroup {
                prefix,
                postfix,
                value,
            } => write!(
                f,
                "Ambiguous group: duplicate frame {} in {}*{}",
                value, prefix, postfix
            ),
            ScanError::GroupIndexOutOfRange { index, count } => {
                write!(f, "Group index {} out of range (have {})", index, count)
            }
            ScanError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ScanError {}
