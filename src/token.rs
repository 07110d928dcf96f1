//! Numeric token extraction from filenames.
//!
//! **Why**: Sequence frames embed their number somewhere in the name
//! (`render.0001.exr`, `shot_12.png`). The parser locates the rightmost
//! digit run, because sequence numbers conventionally sit right before the
//! extension and a resolution code earlier in the name must not win
//! (`clip_2k_0001.exr` → 1, not 2).
//!
//! **Used by**: Pattern matcher (inference mode), group builder.

/// One filename split around its numeric token.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameMatch {
    /// Everything before the digit run (and before the sign, if any).
    pub prefix: String,
    /// Everything after the digit run.
    pub postfix: String,
    /// The digit run exactly as written, leading zeros included.
    pub literal: String,
    /// Parsed base-10 value, sign applied.
    pub value: i64,
    /// Digit count as written when zero-padded, 0 when unpadded.
    pub num_fill: usize,
    /// True when a `-` immediately preceded the run (signed mode only).
    pub negative: bool,
}

/// Padding width of a digit run as written.
///
/// A run is padded only when it carries leading zeros that a plain decimal
/// rendering would not produce: `"0001"` → 4, `"001"` → 3, `"12"` → 0,
/// `"0"` → 0. Unpadded runs of any length share width 0, so `f_1`, `f_10`
/// and `f_100` group together while `f_01` stays separate.
pub fn classify_fill(literal: &str) -> usize {
    if literal.len() > 1 && literal.starts_with('0') {
        literal.len()
    } else {
        0
    }
}

/// Extract the rightmost maximal digit run from `name`.
///
/// When `signed` is set, a single `-` directly before the run is consumed
/// as the sign and excluded from the prefix. Returns `None` when the name
/// contains no digits, or the value overflows `i64`.
pub fn parse_token(name: &str, signed: bool) -> Option<FilenameMatch> {
    let bytes = name.as_bytes();

    // Rightmost digit, then extend left through the run.
    let end = bytes.iter().rposition(|b| b.is_ascii_digit())? + 1;
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }

    let literal = &name[start..end];
    let negative = signed && start > 0 && bytes[start - 1] == b'-';
    let prefix_end = if negative { start - 1 } else { start };

    let mut value: i64 = literal.parse().ok()?;
    if negative {
        value = -value;
    }

    Some(FilenameMatch {
        prefix: name[..prefix_end].to_string(),
        postfix: name[end..].to_string(),
        literal: literal.to_string(),
        value,
        num_fill: classify_fill(literal),
        negative,
    })
}

/// Render `value` the way a group member writes it: padded with `fill_char`
/// to `num_fill` digits when `num_fill > 0`, plain decimal otherwise.
/// The sign never counts toward the padding width (`-1` at fill 4 → `-0001`).
pub fn render_number(value: i64, num_fill: usize, fill_char: char) -> String {
    let magnitude = value.unsigned_abs();
    let sign = if value < 0 { "-" } else { "" };
    if num_fill == 0 {
        return format!("{}{}", sign, magnitude);
    }
    let digits = magnitude.to_string();
    let mut out = String::with_capacity(sign.len() + num_fill.max(digits.len()));
    out.push_str(sign);
    for _ in digits.len()..num_fill {
        out.push(fill_char);
    }
    out.push_str(&digits);
    out
}
