//! Grouping of matched filenames into detected sequences.
//!
//! **Why**: One directory commonly holds several interleaved sequences
//! (`left_0001.png` / `right_0001.png`, or the same name at different
//! paddings). Bucketing by (prefix, postfix, padding width) resolves each
//! independently instead of merging them into one broken range.
//!
//! **Used by**: `Sequence` construction; unit-testable on injected
//! filename lists with no filesystem.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScanError;
use crate::pattern::Matcher;
use crate::token;

/// One detected sequence within a scanned directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilenamesGroup {
    /// Member filenames in scan order, exactly as listed.
    pub filenames: Vec<String>,
    /// Text before the frame number, identical across members.
    pub prefix: String,
    /// Text after the frame number, identical across members.
    pub postfix: String,
    /// Smallest frame number observed.
    pub first: i64,
    /// Largest frame number observed.
    pub last: i64,
    /// Inferred stride between consecutive frames, always positive.
    pub step: i64,
    /// Padding width; 0 means unpadded decimal rendering.
    pub num_fill: usize,
    /// Padding character, normally '0'.
    pub fill_char: char,
}

impl FilenamesGroup {
    /// Render the filename for an arbitrary frame number.
    ///
    /// Pure string reconstruction: no bound or stride check, so callers
    /// can probe for files that may not exist.
    pub fn filename_at(&self, time: i64) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            token::render_number(time, self.num_fill, self.fill_char),
            self.postfix
        )
    }

    /// Inclusive [first, last] frame range.
    pub fn range(&self) -> (i64, i64) {
        (self.first, self.last)
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }

    /// Frame numbers on the first..=last stride grid with no file present.
    pub fn holes(&self) -> Vec<i64> {
        let present: std::collections::HashSet<String> =
            self.filenames.iter().cloned().collect();
        let mut missing = Vec::new();
        let mut t = self.first;
        while t <= self.last {
            if !present.contains(&self.filename_at(t)) {
                missing.push(t);
            }
            t += self.step;
        }
        missing
    }
}

/// Scan behavior knobs.
///
/// `start`/`step` are hints applied to every detected group after
/// inference; they never filter files out of a group.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Allow a `-` immediately before the digit run.
    pub signed: bool,
    /// Override the inferred first frame of each group.
    pub start: Option<i64>,
    /// Override the inferred step of each group.
    pub step: Option<i64>,
}

/// List a directory's regular files, sorted lexicographically.
///
/// Non-recursive; dot-prefixed names are skipped like ordinary hidden
/// files. Sorting fixes the scan order so group detection is deterministic
/// across platforms (`read_dir` order is arbitrary).
pub fn scan_dir(dir: &Path) -> Result<Vec<String>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    let entries =
        std::fs::read_dir(dir).map_err(|e| ScanError::Io(format!("{}: {}", dir.display(), e)))?;
    for entry in entries {
        let entry = entry.map_err(|e| ScanError::Io(format!("{}: {}", dir.display(), e)))?;
        let is_file = entry
            .file_type()
            .map_err(|e| ScanError::Io(format!("{}: {}", dir.display(), e)))?
            .is_file();
        if !is_file {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[derive(Hash, PartialEq, Eq)]
struct GroupKey {
    prefix: String,
    postfix: String,
    num_fill: usize,
}

/// Step = gcd of consecutive differences of the sorted values.
///
/// Gap-tolerant: 1,3,7,9 infers step 2 with 5 as a hole rather than a
/// broken sequence. Single member → 1.
fn infer_step(sorted: &[i64]) -> i64 {
    let mut g: i64 = 0;
    for w in sorted.windows(2) {
        g = gcd(g, w[1] - w[0]);
    }
    g.max(1)
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Bucket matched filenames into groups.
///
/// Groups come out in first-appearance order of their key over the input
/// order. Buckets holding duplicate frame numbers are excluded and
/// reported in the second return value instead of silently merged: a
/// duplicated value means two members render to the same name, so one of
/// them would be unreconstructable.
pub fn build_groups(
    names: &[String],
    matcher: &Matcher,
    opts: &ScanOptions,
) -> (Vec<FilenamesGroup>, Vec<ScanError>) {
    let mut buckets: IndexMap<GroupKey, Vec<(i64, String)>> = IndexMap::new();

    for name in names {
        match matcher.apply(name) {
            Some(m) => {
                let key = GroupKey {
                    prefix: m.prefix,
                    postfix: m.postfix,
                    num_fill: m.num_fill,
                };
                buckets.entry(key).or_default().push((m.value, name.clone()));
            }
            None => debug!("Skipping non-matching entry: {}", name),
        }
    }

    let mut groups = Vec::new();
    let mut conflicts = Vec::new();

    for (key, members) in buckets {
        let mut values: Vec<i64> = members.iter().map(|(v, _)| *v).collect();
        values.sort_unstable();

        let first = values[0];
        let last = values[values.len() - 1];

        if let Some(dup) = values.windows(2).find(|w| w[0] == w[1]) {
            warn!(
                "Excluding ambiguous group {}*{}: duplicate frame {}",
                key.prefix, key.postfix, dup[0]
            );
            conflicts.push(ScanError::AmbiguousGroup {
                prefix: key.prefix,
                postfix: key.postfix,
                value: dup[0],
            });
            continue;
        }

        let group = FilenamesGroup {
            filenames: members.into_iter().map(|(_, n)| n).collect(),
            prefix: key.prefix,
            postfix: key.postfix,
            first: opts.start.unwrap_or(first),
            last,
            // Step stays positive even under a bad override.
            step: opts.step.unwrap_or_else(|| infer_step(&values)).max(1),
            num_fill: key.num_fill,
            fill_char: '0',
        };
        info!(
            "Detected group: {}*{} ({}..{} step {}, {} files)",
            group.prefix,
            group.postfix,
            group.first,
            group.last,
            group.step,
            group.len()
        );
        groups.push(group);
    }

    (groups, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn infer() -> Matcher {
        Matcher::Infer { signed: false }
    }

    #[test]
    fn test_interleaved_sequences_split() {
        let input = names(&[
            "left_0001.png",
            "left_0002.png",
            "left_0003.png",
            "right_0001.png",
            "right_0002.png",
            "right_0003.png",
        ]);
        let (groups, conflicts) = build_groups(&input, &infer(), &ScanOptions::default());
        assert!(conflicts.is_empty());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].prefix, "left_");
        assert_eq!(groups[1].prefix, "right_");
        for g in &groups {
            assert_eq!(g.range(), (1, 3));
            assert_eq!(g.step, 1);
        }
    }

    #[test]
    fn test_padding_widths_split() {
        let input = names(&["f_1.png", "f_01.png", "f_001.png"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups.len(), 3);
        let fills: Vec<usize> = groups.iter().map(|g| g.num_fill).collect();
        assert!(fills.contains(&0));
        assert!(fills.contains(&2));
        assert!(fills.contains(&3));
    }

    #[test]
    fn test_unpadded_widths_merge() {
        // No leading zeros: 1, 10, 100 all share the unpadded bucket.
        let input = names(&["f_1.png", "f_10.png", "f_100.png"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].range(), (1, 100));
    }

    #[test]
    fn test_gapped_stride() {
        let input = names(&["s.0001.exr", "s.0003.exr", "s.0005.exr", "s.0007.exr"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first, 1);
        assert_eq!(groups[0].last, 7);
        assert_eq!(groups[0].step, 2);
    }

    #[test]
    fn test_hole_keeps_stride() {
        // 1,3,7,9: hole at 5, still step 2.
        let input = names(&["s.0001.exr", "s.0003.exr", "s.0007.exr", "s.0009.exr"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups[0].step, 2);
        assert_eq!(groups[0].holes(), vec![5]);
    }

    #[test]
    fn test_single_file_group() {
        let input = names(&["alone.0042.exr"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first, 42);
        assert_eq!(groups[0].last, 42);
        assert_eq!(groups[0].step, 1);
    }

    #[test]
    fn test_ambiguous_bucket_excluded() {
        // Injected duplicates: same key and value, different names cannot
        // come from a real directory but can from a caller-supplied list.
        let input = names(&["a_0001.png", "a_0001.png", "b_0001.png", "b_0002.png"]);
        let (groups, conflicts) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].prefix, "b_");
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            conflicts[0],
            ScanError::AmbiguousGroup { value: 1, .. }
        ));
    }

    #[test]
    fn test_mixed_padding_under_unpadded_pattern_is_ambiguous() {
        // f_%d.jpg pins num_fill 0, so f_1.jpg and f_01.jpg both capture
        // value 1 into one bucket. filename_at(1) could only rebuild one
        // of them; the bucket must be excluded, not silently merged.
        let input = names(&["f_1.jpg", "f_01.jpg", "f_2.jpg"]);
        let p = crate::pattern::CompiledPattern::compile("f_%d.jpg", false).unwrap();
        let (groups, conflicts) = build_groups(&input, &Matcher::Pattern(p), &ScanOptions::default());
        assert!(groups.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            conflicts[0],
            ScanError::AmbiguousGroup { value: 1, .. }
        ));
    }

    #[test]
    fn test_partial_duplicate_excluded() {
        // Not all values identical: 1,1,2 still carries a duplicate.
        let input = names(&["a_0001.png", "a_0001.png", "a_0002.png"]);
        let (groups, conflicts) = build_groups(&input, &infer(), &ScanOptions::default());
        assert!(groups.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            conflicts[0],
            ScanError::AmbiguousGroup { value: 1, .. }
        ));
    }

    #[test]
    fn test_first_appearance_order() {
        let input = names(&["b_0001.png", "a_0001.png", "b_0002.png", "a_0002.png"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        assert_eq!(groups[0].prefix, "b_");
        assert_eq!(groups[1].prefix, "a_");
    }

    #[test]
    fn test_scan_order_preserved_in_members() {
        let input = names(&["s.0003.exr", "s.0001.exr", "s.0002.exr"]);
        let (groups, _) = build_groups(&input, &infer(), &ScanOptions::default());
        // Member list keeps input order even though range sorts values.
        assert_eq!(
            groups[0].filenames,
            vec!["s.0003.exr", "s.0001.exr", "s.0002.exr"]
        );
        assert_eq!(groups[0].range(), (1, 3));
    }

    #[test]
    fn test_overrides_applied() {
        let input = names(&["s.0002.exr", "s.0004.exr"]);
        let opts = ScanOptions {
            start: Some(10),
            step: Some(5),
            ..Default::default()
        };
        let (groups, _) = build_groups(&input, &infer(), &opts);
        assert_eq!(groups[0].first, 10);
        assert_eq!(groups[0].step, 5);
    }

    #[test]
    fn test_explicit_pattern_restricts() {
        let input = names(&["left_0001.png", "right_0001.png", "left_0002.png"]);
        let p = crate::pattern::CompiledPattern::compile("left_####.png", false).unwrap();
        let (groups, _) = build_groups(&input, &Matcher::Pattern(p), &ScanOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].prefix, "left_");
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let input = names(&["readme.txt", "notes.md"]);
        let (groups, conflicts) = build_groups(&input, &infer(), &ScanOptions::default());
        assert!(groups.is_empty());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_infer_step_values() {
        assert_eq!(infer_step(&[5]), 1);
        assert_eq!(infer_step(&[1, 2, 3]), 1);
        assert_eq!(infer_step(&[10, 20, 30]), 10);
        assert_eq!(infer_step(&[1, 3, 7, 9]), 2);
        assert_eq!(infer_step(&[0, 6, 15]), 3);
    }
}
