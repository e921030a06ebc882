// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! File name sanitization for configured output names.

/// Longest file name accepted, in bytes. The common floor across the
/// filesystems the recorder writes to.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Name used when sanitization strips the input down to nothing.
const EMPTY_NAME_PLACEHOLDER: &str = "_";

/// True for characters that cannot appear in a file name on at least one
/// supported platform.
fn is_invalid(c: char) -> bool {
    c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// True for characters a file name may not start or end with.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '.'
}

/// Makes a configured name safe to use as a file name.
///
/// Invalid characters are removed, leading/trailing whitespace and dots
/// are trimmed, an empty result falls back to `"_"`, and the name is
/// truncated to 255 bytes on a character boundary. Idempotent: applying
/// twice yields the first result.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !is_invalid(*c)).collect();
    let trimmed = stripped.trim_matches(is_trimmable);
    if trimmed.is_empty() {
        return EMPTY_NAME_PLACEHOLDER.to_string();
    }
    let mut result = truncate_at_char_boundary(trimmed, MAX_FILE_NAME_BYTES).to_string();
    // Truncation can expose a new trailing dot or space; re-trim so the
    // result is a fixed point.
    let retrimmed = result.trim_end_matches(is_trimmable);
    result.truncate(retrimmed.len());
    result
}

/// Longest prefix of `name` that fits `max_bytes` without splitting a
/// character.
fn truncate_at_char_boundary(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn passes_clean_names_through() {
        assert_eq!(sanitize_file_name("run_output.ndjson"), "run_output.ndjson");
    }

    #[test]
    fn strips_invalid_characters() {
        assert_eq!(sanitize_file_name("a<b>c:d\"e/f\\g|h?i*j"), "abcdefghij");
        assert_eq!(sanitize_file_name("tab\tand\nnewline"), "tabandnewline");
    }

    #[test]
    fn trims_whitespace_and_dots_at_both_ends() {
        assert_eq!(sanitize_file_name("  .report.ndjson. "), "report.ndjson");
    }

    #[test]
    fn empty_input_falls_back_to_placeholder() {
        assert_eq!(sanitize_file_name(""), "_");
        assert_eq!(sanitize_file_name(" ... "), "_");
        assert_eq!(sanitize_file_name("???"), "_");
    }

    #[test]
    fn caps_length_at_255_bytes_on_a_char_boundary() {
        let long = "x".repeat(300);
        let sanitized = sanitize_file_name(&long);
        assert_eq!(sanitized.len(), 255);

        // Multi-byte char straddling the cap must not be split.
        let mut tricky = "x".repeat(254);
        tricky.push('é');
        tricky.push_str("tail");
        let sanitized = sanitize_file_name(&tricky);
        assert_eq!(sanitized.len(), 254);
        assert!(sanitized.is_char_boundary(sanitized.len()));
    }

    #[test]
    fn truncation_does_not_leave_a_trailing_dot() {
        let mut name = "y".repeat(254);
        name.push('.');
        name.push_str("ndjson");
        let sanitized = sanitize_file_name(&name);
        assert!(!sanitized.ends_with('.'));
        assert_eq!(sanitized.len(), 254);
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(name in ".{0,400}") {
            let once = sanitize_file_name(&name);
            let twice = sanitize_file_name(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn sanitized_names_are_always_usable(name in ".{0,400}") {
            let sanitized = sanitize_file_name(&name);
            prop_assert!(!sanitized.is_empty());
            prop_assert!(sanitized.len() <= 255);
            prop_assert!(!sanitized.chars().any(is_invalid));
            prop_assert!(!sanitized.starts_with(is_trimmable));
            prop_assert!(!sanitized.ends_with(is_trimmable));
        }
    }
}
