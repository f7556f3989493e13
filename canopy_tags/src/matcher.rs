// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicates deciding smart tag membership.

use alloc::string::String;
use alloc::vec::Vec;

use crate::tag::Taggable;

/// Predicate over the attributes of a [`Taggable`].
///
/// Patterns are globs: `*` matches any run of characters, `?` matches a single
/// character. Matching ignores ASCII case, since texture and class names in map
/// files are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagMatcher {
    /// The attribute `name` exists and its value matches `pattern`.
    AttributeValue {
        /// Attribute name (exact).
        name: String,
        /// Glob applied to the value.
        pattern: String,
    },
    /// The attribute exists, whatever its value.
    HasAttribute(String),
    /// The texture name matches the glob.
    TextureName(String),
    /// At least one of the inner matchers matches.
    Any(Vec<TagMatcher>),
    /// Every inner matcher matches.
    All(Vec<TagMatcher>),
}

impl TagMatcher {
    /// Convenience constructor for [`TagMatcher::AttributeValue`].
    pub fn attribute_value(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::AttributeValue {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Evaluate the predicate.
    pub fn matches<T: Taggable + ?Sized>(&self, taggable: &T) -> bool {
        match self {
            Self::AttributeValue { name, pattern } => taggable
                .attribute(name)
                .is_some_and(|value| matches_glob(pattern, value)),
            Self::HasAttribute(name) => taggable.attribute(name).is_some(),
            Self::TextureName(pattern) => taggable
                .texture()
                .is_some_and(|texture| matches_glob(pattern, texture)),
            Self::Any(inner) => inner.iter().any(|m| m.matches(taggable)),
            Self::All(inner) => inner.iter().all(|m| m.matches(taggable)),
        }
    }
}

/// Case-insensitive glob match supporting `*` and `?`.
pub fn matches_glob(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` and the text index it is currently matched up to.
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi].eq_ignore_ascii_case(&t[ti])) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_basics() {
        assert!(matches_glob("*", ""));
        assert!(matches_glob("*", "anything"));
        assert!(matches_glob("clip", "CLIP"));
        assert!(matches_glob("*water*", "e1m1_WATER_2"));
        assert!(matches_glob("trigger_?", "trigger_1"));
        assert!(!matches_glob("trigger_?", "trigger_10"));
        assert!(matches_glob("a*b*c", "aXXbYYc"));
        assert!(!matches_glob("a*b*c", "aXXbYY"));
        assert!(!matches_glob("", "x"));
    }
}
