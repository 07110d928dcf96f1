//! Sequence detection and indexing over one directory.
//!
//! **Why**: Renders land on disk as numbered frames (`render.0001.exr`,
//! `render.0002.exr`, …). A `Sequence` scans a directory once, resolves
//! every independent numbering scheme in it, and answers frame → filename
//! queries without touching the filesystem again.
//!
//! **Used by**: anything that needs to open frames by number — readers,
//! writers, the `seqls` binary.
//!
//! # Detection
//!
//! 1. List the directory (regular files, sorted; hidden entries skipped)
//! 2. Match each entry: explicit pattern (`name.####.ext`, `%04d`) or
//!    rightmost-digit-run inference when no pattern is given
//! 3. Bucket by (prefix, postfix, padding width) — several interleaved
//!    sequences in one folder stay separate
//! 4. Per group: frame range from min/max, stride from the gcd of the
//!    sorted differences (gap-tolerant)
//!
//! # Cursor
//!
//! `first_filename` / `next_filename` walk the arithmetic progression
//! first, first+step, … through a mutable cursor. The cursor is the only
//! mutable state after construction and is not safe for concurrent use
//! within one instance; concurrent callers serialize around it or use the
//! stateless `filename_at` with their own frame counters. Distinct
//! `Sequence` instances share nothing and may be used from separate
//! threads freely.

use log::info;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::groups::{self, FilenamesGroup, ScanOptions};
use crate::pattern::{CompiledPattern, Matcher};

/// Detected sequences of one directory plus an iteration cursor.
#[derive(Debug, Clone)]
pub struct Sequence {
    path: PathBuf,
    pattern: Option<String>,
    groups: Vec<FilenamesGroup>,
    conflicts: Vec<ScanError>,
    cursor: i64,
    cursor_group: usize,
}

impl Sequence {
    /// Scan `dir` in inference mode with default options.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::scan_with(dir, None, &ScanOptions::default())
    }

    /// Scan `dir`, optionally restricted to an explicit pattern.
    ///
    /// The pattern is compiled before the directory is touched, so a
    /// malformed pattern fails with [`ScanError::InvalidPattern`] without
    /// any filesystem access.
    pub fn scan_with(
        dir: impl AsRef<Path>,
        pattern: Option<&str>,
        opts: &ScanOptions,
    ) -> Result<Self, ScanError> {
        let mut seq = Self {
            path: dir.as_ref().to_path_buf(),
            pattern: None,
            groups: Vec::new(),
            conflicts: Vec::new(),
            cursor: 0,
            cursor_group: 0,
        };
        seq.rescan(pattern, opts)?;
        Ok(seq)
    }

    /// Point the instance at a new directory and rescan.
    ///
    /// Cached groups, conflicts and cursor are discarded up front: if the
    /// new scan fails the instance stays valid and empty
    /// (`num_groups() == 0`), never partially updated.
    pub fn reset(
        &mut self,
        dir: impl AsRef<Path>,
        pattern: Option<&str>,
        opts: &ScanOptions,
    ) -> Result<(), ScanError> {
        self.path = dir.as_ref().to_path_buf();
        self.rescan(pattern, opts)
    }

    fn rescan(&mut self, pattern: Option<&str>, opts: &ScanOptions) -> Result<(), ScanError> {
        self.pattern = None;
        self.groups.clear();
        self.conflicts.clear();
        self.cursor = 0;
        self.cursor_group = 0;

        // Pattern compile precedes the directory scan.
        let matcher = match pattern {
            Some(p) => Matcher::Pattern(CompiledPattern::compile(p, opts.signed)?),
            None => Matcher::Infer {
                signed: opts.signed,
            },
        };

        let names = groups::scan_dir(&self.path)?;
        let (groups, conflicts) = groups::build_groups(&names, &matcher, opts);

        self.pattern = pattern.map(|p| p.to_string());
        self.groups = groups;
        self.conflicts = conflicts;
        if let Some(g) = self.groups.first() {
            self.cursor = g.first;
        }

        info!(
            "Scanned {}: {} group(s), {} conflict(s)",
            self.path.display(),
            self.groups.len(),
            self.conflicts.len()
        );
        Ok(())
    }

    /// Count of detected groups.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// All detected groups in first-appearance scan order.
    pub fn groups(&self) -> &[FilenamesGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&FilenamesGroup> {
        self.groups.get(index)
    }

    /// Ambiguous buckets excluded during the last scan.
    pub fn conflicts(&self) -> &[ScanError] {
        &self.conflicts
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The explicit pattern of the last scan, if one was given.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    // Default group policy: `None` selects group 0, the first-detected
    // group in scan order. Callers that care which of several interleaved
    // sequences they get must pass an explicit index.
    fn select(&self, group: Option<usize>) -> Result<(usize, &FilenamesGroup), ScanError> {
        let index = group.unwrap_or(0);
        match self.groups.get(index) {
            Some(g) => Ok((index, g)),
            None => Err(ScanError::GroupIndexOutOfRange {
                index,
                count: self.groups.len(),
            }),
        }
    }

    /// Inclusive [first, last] range of the selected group.
    pub fn range(&self, group: Option<usize>) -> Result<(i64, i64), ScanError> {
        Ok(self.select(group)?.1.range())
    }

    /// Inferred stride of the selected group.
    pub fn step(&self, group: Option<usize>) -> Result<i64, ScanError> {
        Ok(self.select(group)?.1.step)
    }

    /// Filename for frame `time` in the selected group.
    ///
    /// Pure rendering — no check that `time` lies inside the range or on
    /// the stride grid, so callers can probe for files that may not exist.
    pub fn filename_at(&self, time: i64, group: Option<usize>) -> Result<String, ScanError> {
        Ok(self.select(group)?.1.filename_at(time))
    }

    /// Directory-joined path for frame `time`, OS separator convention.
    pub fn path_at(&self, time: i64, group: Option<usize>) -> Result<PathBuf, ScanError> {
        Ok(self.path.join(self.filename_at(time, group)?))
    }

    /// Seat the cursor at the group's first frame and return its filename.
    pub fn first_filename(&mut self, group: Option<usize>) -> Result<String, ScanError> {
        let (index, g) = self.select(group)?;
        let first = g.first;
        let name = g.filename_at(first);
        self.cursor = first;
        self.cursor_group = index;
        Ok(name)
    }

    /// Advance the cursor by the group's step and return the filename at
    /// the new position.
    ///
    /// Unbounded: repeated calls yield first, first+step, first+2·step, …
    /// past `last`; callers stop based on `range`. Switching to a
    /// different group re-seats the cursor at that group's first frame.
    pub fn next_filename(&mut self, group: Option<usize>) -> Result<String, ScanError> {
        let (index, g) = self.select(group)?;
        let seat = if index != self.cursor_group {
            g.first
        } else {
            self.cursor
        };
        let next = seat + g.step;
        let name = g.filename_at(next);
        self.cursor = next;
        self.cursor_group = index;
        Ok(name)
    }
}
