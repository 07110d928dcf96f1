//! SEQDIR - File sequence detection and indexing library
//!
//! Finds numbered file sequences in a directory (`shot_0001.png`,
//! `shot_0002.png`, …), reconstructs each numbering scheme and answers
//! frame → filename queries.

pub mod error;
pub mod groups;
pub mod pattern;
pub mod sequence;
pub mod token;

// Re-export commonly used types
pub use error::ScanError;
pub use groups::{FilenamesGroup, ScanOptions};
pub use pattern::{CompiledPattern, Matcher};
pub use sequence::Sequence;
pub use token::FilenameMatch;
