//! Filesystem-safe name tokens for evidence paths.
//!
//! Feature and scenario names are free text supplied by test authors, so
//! anything that lands in a path segment goes through here first. Two
//! distinct names may sanitize to the same token; the surrounding paths
//! embed a timestamp, and collisions within the same second are accepted.

/// Characters that are invalid in path segments on at least one supported
/// filesystem.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a sanitized token, in characters.
const MAX_LEN: usize = 100;

/// Normalize free text into a string safe for use as a path segment.
///
/// Invalid characters become `_`, leading/trailing whitespace and literal
/// dots are stripped, and the result is capped at 100 characters. The
/// mapping is deterministic and performs no collision resolution.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|ch| if INVALID_CHARS.contains(&ch) { '_' } else { ch })
        .collect();

    let trimmed = replaced.trim_matches(|ch: char| ch.is_whitespace() || ch == '.');

    trimmed.chars().take(MAX_LEN).collect()
}
