// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Equivalence tolerances applied during deep comparison.
//!
//! Two trace streams recorded by independent implementations never agree byte
//! for byte: clocks differ, platforms pick their own line endings, locales
//! tag dialects onto languages, and support code declares extra hooks. The
//! [`EquivalenceRules`] value states exactly which of those drifts the
//! comparison forgives. Attachments are exempt from all of it: their payload
//! fields are always compared byte for byte.

use std::borrow::Cow;

/// Tolerances the deep comparison applies to paired elements.
///
/// [`EquivalenceRules::new`] enables every tolerance, which is what
/// cross-implementation validation wants. [`EquivalenceRules::strict`]
/// disables them all, leaving only the structural id erasure in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceRules {
    /// Normalize `\r\n` and `\r` to `\n` before comparing text fields.
    pub normalize_line_endings: bool,
    /// Compare `language` fields on the primary subtag only (`en-US` ≡ `en`).
    pub language_primary_subtag: bool,
    /// Treat all timestamps and durations as equivalent.
    pub ignore_clocks: bool,
    /// Compare hook collections by containment instead of position: every
    /// expected hook must have an equivalent actual member, extras tolerated.
    pub hook_containment: bool,
}

impl EquivalenceRules {
    /// Rules for validating one implementation's stream against another's.
    #[must_use]
    pub fn new() -> Self {
        Self {
            normalize_line_endings: true,
            language_primary_subtag: true,
            ignore_clocks: true,
            hook_containment: true,
        }
    }

    /// Rules with every tolerance disabled.
    ///
    /// Useful when both streams come from the same implementation and any
    /// drift at all is a regression.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            normalize_line_endings: false,
            language_primary_subtag: false,
            ignore_clocks: false,
            hook_containment: false,
        }
    }

    /// Compares two text fields under the line-ending rule.
    #[must_use]
    pub fn strings_match(&self, actual: &str, expected: &str) -> bool {
        if self.normalize_line_endings {
            normalize_newlines(actual) == normalize_newlines(expected)
        } else {
            actual == expected
        }
    }

    /// Compares two optional text fields; presence must agree.
    #[must_use]
    pub fn option_strings_match(&self, actual: Option<&str>, expected: Option<&str>) -> bool {
        match (actual, expected) {
            (Some(actual), Some(expected)) => self.strings_match(actual, expected),
            (None, None) => true,
            _ => false,
        }
    }

    /// Compares two `language` fields under the primary-subtag rule.
    #[must_use]
    pub fn languages_match(&self, actual: &str, expected: &str) -> bool {
        if self.language_primary_subtag {
            primary_subtag(actual) == primary_subtag(expected)
        } else {
            actual == expected
        }
    }
}

impl Default for EquivalenceRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites `\r\n` and bare `\r` to `\n`, borrowing when nothing changes.
#[must_use]
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Returns the part of a BCP 47 language tag before the first `-`.
#[must_use]
pub fn primary_subtag(language: &str) -> &str {
    language.split('-').next().unwrap_or(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_normalization_covers_all_three_conventions() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert!(matches!(normalize_newlines("untouched"), Cow::Borrowed(_)));
    }

    #[test]
    fn language_tags_match_on_primary_subtag() {
        let rules = EquivalenceRules::new();
        assert!(rules.languages_match("en-US", "en"));
        assert!(rules.languages_match("pt-BR", "pt-PT"));
        assert!(!rules.languages_match("fr", "en"));
    }

    #[test]
    fn strict_rules_forgive_nothing() {
        let rules = EquivalenceRules::strict();
        assert!(!rules.strings_match("line\r\n", "line\n"));
        assert!(!rules.languages_match("en-US", "en"));
        assert!(!rules.ignore_clocks);
        assert!(!rules.hook_containment);
    }

    #[test]
    fn option_strings_require_matching_presence() {
        let rules = EquivalenceRules::new();
        assert!(rules.option_strings_match(Some("x\r\n"), Some("x\n")));
        assert!(rules.option_strings_match(None, None));
        assert!(!rules.option_strings_match(Some("x"), None));
    }
}
