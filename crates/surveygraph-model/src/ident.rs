//! Variable-code grammar and deterministic repair.
//!
//! Codes used to build external identifiers must match
//! `letter (letter | digit | '_')*`. Non-conforming values are rewritten by
//! stripping forbidden characters and prefixing a marker that distinguishes
//! root questions (`Q`) from subquestions (`SQ`). The rewrite depends only
//! on the input and the entity's position, so repeated runs produce
//! identical output.

/// Prefix applied when repairing a root question code.
pub const QUESTION_CODE_PREFIX: &str = "Q";

/// Prefix applied when repairing a subquestion code.
pub const SUBQUESTION_CODE_PREFIX: &str = "SQ";

/// Check a code against the identifier grammar.
pub fn is_valid_code(code: &str) -> bool {
    let mut chars = code.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Rewrite `raw` into a valid code.
///
/// Already-valid codes pass through untouched. Otherwise forbidden
/// characters are stripped and `prefix` is prepended; if nothing survives
/// the strip, the 1-based `position` stands in for the lost value.
pub fn sanitize_code(raw: &str, prefix: &str, position: usize) -> String {
    if is_valid_code(raw) {
        return raw.to_string();
    }

    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if stripped.is_empty() {
        return format!("{prefix}{position}");
    }

    format!("{prefix}{stripped}")
}
