//! Filename pattern compilation and matching.
//!
//! Two modes:
//! - Explicit: the caller supplies a pattern with one numeric placeholder
//!   (`name.####.ext` or printf-style `name.%04d.ext`); it compiles to an
//!   anchored regex with a single capture group around the digits.
//! - Inference: no pattern; every entry is split by the numeric token
//!   parser and self-describes its candidate group.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScanError;
use crate::token::{self, FilenameMatch};

// Placeholder syntaxes: runs of '#', %0Nd, bare %d.
static HASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+").unwrap());
static PRINTF_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"%0(\d+)d|%d").unwrap());

/// A compiled explicit pattern: anchored regex with exactly one capture
/// group, plus the literal text around the placeholder.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    prefix: String,
    postfix: String,
    num_fill: usize,
    signed: bool,
}

/// One placeholder found in the raw pattern text.
struct Placeholder {
    start: usize,
    end: usize,
    width: usize,
}

fn find_placeholders(pattern: &str) -> Vec<Placeholder> {
    let mut spots: Vec<Placeholder> = HASH_RUN
        .find_iter(pattern)
        .map(|m| Placeholder {
            start: m.start(),
            end: m.end(),
            width: m.as_str().len(),
        })
        .collect();
    for caps in PRINTF_FIELD.captures_iter(pattern) {
        let Some(m) = caps.get(0) else { continue };
        let width = caps
            .get(1)
            .map(|w| w.as_str().parse().unwrap_or(0))
            .unwrap_or(0);
        spots.push(Placeholder {
            start: m.start(),
            end: m.end(),
            width,
        });
    }
    spots.sort_by_key(|p| p.start);
    spots
}

impl CompiledPattern {
    /// Compile `pattern` into a matching rule.
    ///
    /// Fails with [`ScanError::InvalidPattern`] when the pattern has zero
    /// or more than one numeric placeholder, or the generated expression
    /// does not compile. No filesystem access happens here.
    pub fn compile(pattern: &str, signed: bool) -> Result<Self, ScanError> {
        let spots = find_placeholders(pattern);
        match spots.len() {
            0 => {
                return Err(ScanError::InvalidPattern(format!(
                    "no numeric placeholder in '{}'",
                    pattern
                )));
            }
            1 => {}
            n => {
                return Err(ScanError::InvalidPattern(format!(
                    "{} numeric placeholders in '{}', expected exactly one",
                    n, pattern
                )));
            }
        }

        let spot = &spots[0];
        let prefix = pattern[..spot.start].to_string();
        let postfix = pattern[spot.end..].to_string();

        // Exactly one capture group; the optional sign lives inside it.
        let sign = if signed { "-?" } else { "" };
        let field = if spot.width > 0 {
            format!(r"({}\d{{{}}})", sign, spot.width)
        } else {
            format!(r"({}\d+)", sign)
        };
        let expr = format!(
            "^{}{}{}$",
            regex::escape(&prefix),
            field,
            regex::escape(&postfix)
        );
        let regex = Regex::new(&expr)
            .map_err(|e| ScanError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

        debug!("Compiled pattern '{}' -> {}", pattern, expr);

        Ok(Self {
            regex,
            prefix,
            postfix,
            num_fill: spot.width,
            signed,
        })
    }

    /// Match one filename against the compiled pattern.
    pub fn apply(&self, name: &str) -> Option<FilenameMatch> {
        let caps = self.regex.captures(name)?;
        let field = caps.get(1)?.as_str();
        let negative = field.starts_with('-');
        let literal = field.trim_start_matches('-');
        let value: i64 = field.parse().ok()?;
        Some(FilenameMatch {
            prefix: self.prefix.clone(),
            postfix: self.postfix.clone(),
            literal: literal.to_string(),
            value,
            // The pattern pins the width; an unpadded field stays width 0
            // even when a member happens to carry leading zeros.
            num_fill: self.num_fill,
            negative,
        })
    }

    pub fn num_fill(&self) -> usize {
        self.num_fill
    }

    pub fn signed(&self) -> bool {
        self.signed
    }
}

/// Matching rule applied to every directory entry.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Explicit user pattern.
    Pattern(CompiledPattern),
    /// No pattern: each entry self-describes via the token parser.
    /// The flag allows signed frame numbers.
    Infer { signed: bool },
}

impl Matcher {
    pub fn apply(&self, name: &str) -> Option<FilenameMatch> {
        match self {
            Matcher::Pattern(p) => p.apply(name),
            Matcher::Infer { signed } => token::parse_token(name, *signed),
        }
    }
}
