//! Alias rewriting
//!
//! An ordered list of `(matcher, replacement)` rules applied to the
//! decoded request path before it is resolved against the served root.
//! The first matching rule wins and the rest are skipped.

use crate::error::ConfigError;
use regex::Regex;

/// How an alias rule recognizes a path.
#[derive(Debug, Clone)]
pub enum AliasMatcher {
    /// Literal prefix match; the prefix is replaced, the rest is kept.
    Prefix(String),
    /// Regex match; replacement uses the regex's own first-match-only
    /// replace semantics (capture groups like `$1` are available).
    Pattern(Regex),
}

/// A single alias rewrite rule.
#[derive(Debug, Clone)]
pub struct AliasRule {
    matcher: AliasMatcher,
    replacement: String,
}

impl AliasRule {
    /// Rule matching a literal path prefix.
    pub fn prefix(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            matcher: AliasMatcher::Prefix(find.into()),
            replacement: replacement.into(),
        }
    }

    /// Rule matching a regex pattern.
    pub fn pattern(
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            matcher: AliasMatcher::Pattern(regex),
            replacement: replacement.into(),
        })
    }

    /// Apply this rule to a decoded path. `None` when the rule does not
    /// match.
    pub fn apply(&self, path: &str) -> Option<String> {
        match &self.matcher {
            AliasMatcher::Prefix(find) => path
                .strip_prefix(find.as_str())
                .map(|rest| format!("{}{}", self.replacement, rest)),
            AliasMatcher::Pattern(regex) => {
                if regex.is_match(path) {
                    Some(regex.replace(path, self.replacement.as_str()).into_owned())
                } else {
                    None
                }
            }
        }
    }
}

/// Apply the first matching rule, in order. `None` when nothing matched.
pub fn apply_aliases(path: &str, rules: &[AliasRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(path))
}
