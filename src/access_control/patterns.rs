//! Pattern matching for access control
//!
//! Provides glob-based pattern matching for deny rules. Patterns are
//! matched against full normalized absolute paths, so `**/.env` blocks a
//! `.env` file at any depth.

use crate::error::ConfigError;
use globset::{Glob, GlobMatcher};

/// Compiled pattern matcher
#[derive(Debug)]
pub struct PatternMatcher {
    patterns: Vec<CompiledPattern>,
}

#[derive(Debug)]
struct CompiledPattern {
    source: String,
    matcher: GlobMatcher,
}

impl PatternMatcher {
    /// Create a new pattern matcher from a list of glob patterns
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            compiled.push(CompiledPattern {
                source: pattern.clone(),
                matcher: glob.compile_matcher(),
            });
        }

        Ok(Self { patterns: compiled })
    }

    /// Create an empty pattern matcher (matches nothing)
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Check if a path matches any pattern
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matcher.is_match(path))
    }

    /// Check if a path matches any pattern, returning the matching pattern
    pub fn find_match(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.matcher.is_match(path))
            .map(|p| p.source.as_str())
    }

    /// Check if this matcher has any patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Get the number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
