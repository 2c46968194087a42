//! Filesystem access policy
//!
//! Implements the fixed-order policy evaluation:
//! 1. Strict bypass (strict = false allows everything)
//! 2. Deny patterns (absolute veto)
//! 3. Trusted paths (server-resolved references)
//! 4. Allow roots (containment)
//! 5. Default deny

use crate::access_control::patterns::PatternMatcher;
use crate::access_control::types::{AccessDecision, LoadDecision};
use crate::config::FsAccessConfig;
use crate::error::{ConfigError, PolicyDeniedError};
use crate::paths;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Immutable filesystem access policy.
///
/// Constructed once at server start and shared read-only across requests;
/// evaluation never mutates state, so no locking is needed.
pub struct FsPolicy {
    /// When false, the policy is bypassed entirely.
    strict: bool,
    /// Glob patterns whose match forbids serving unconditionally.
    deny: PatternMatcher,
    /// Absolute paths the server itself resolved and therefore trusts.
    /// Membership is exact: trusted paths are inserted in the same
    /// normalized form the policy is queried with.
    trusted: HashSet<String>,
    /// Absolute directories whose contents may be served.
    allow_roots: Vec<String>,
}

impl FsPolicy {
    /// Build a policy from configuration.
    ///
    /// Roots are normalized here so that every later containment check
    /// operates on the canonical forward-slash form.
    pub fn new(config: &FsAccessConfig) -> Result<Self, ConfigError> {
        let deny = PatternMatcher::new(&config.deny)?;
        let allow_roots = config
            .allow
            .iter()
            .map(|root| paths::normalize_path(root))
            .collect();

        Ok(Self {
            strict: config.strict,
            deny,
            trusted: HashSet::new(),
            allow_roots,
        })
    }

    /// Add server-resolved paths that are trusted without containment
    /// checks (deny patterns still apply). Builder-style so the policy
    /// stays immutable once shared.
    pub fn with_trusted_paths<I, S>(mut self, paths_iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.trusted.extend(
            paths_iter
                .into_iter()
                .map(|p| paths::normalize_path(p.as_ref())),
        );
        self
    }

    /// The configured allow roots, for diagnostics and the denial page.
    pub fn allow_roots(&self) -> &[String] {
        &self.allow_roots
    }

    /// Whether strict checking is enabled.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Classify a normalized absolute path against the policy.
    ///
    /// Pure and free of disk I/O; cheap enough to run on every request.
    pub fn classify(&self, path: &str) -> AccessDecision {
        if !self.strict {
            return AccessDecision::Allowed;
        }

        if let Some(pattern) = self.deny.find_match(path) {
            trace!(path, pattern, "matched deny pattern");
            return AccessDecision::Denied(format!("denied by pattern '{pattern}'"));
        }

        if self.trusted.contains(path) {
            trace!(path, "trusted path");
            return AccessDecision::Allowed;
        }

        if let Some(root) = self
            .allow_roots
            .iter()
            .find(|root| paths::is_in_target_path(root.as_str(), path))
        {
            trace!(path, root = root.as_str(), "inside allowed root");
            return AccessDecision::Allowed;
        }

        debug!(path, "path outside every allowed root");
        AccessDecision::Denied("outside the allowed roots".to_string())
    }

    /// Existence-aware access check.
    ///
    /// A policy-denied path only produces `Denied` when something real is
    /// sitting at it; otherwise the decision is `Fallback` so the request
    /// can be picked up by a later handler.
    pub fn check_loading_access(&self, path: &str) -> LoadDecision {
        match self.classify(path) {
            AccessDecision::Allowed => LoadDecision::Allowed,
            AccessDecision::Denied(reason) => {
                if std::fs::metadata(path).is_ok() {
                    LoadDecision::Denied(reason)
                } else {
                    LoadDecision::Fallback
                }
            }
        }
    }

    /// Per-path predicate handed to the file-server collaborator.
    ///
    /// `Ok(true)` means serve, `Ok(false)` means decline without an
    /// opinion, and `Err` carries the typed denial the orchestration
    /// layer turns into a 403.
    pub fn loading_guard(&self, path: &str) -> Result<bool, PolicyDeniedError> {
        match self.check_loading_access(path) {
            LoadDecision::Allowed => Ok(true),
            LoadDecision::Fallback => Ok(false),
            LoadDecision::Denied(reason) => Err(PolicyDeniedError::new(path, reason)),
        }
    }

    /// Classify and convert a denial into an error, for call sites that
    /// need a `Result` rather than a decision value.
    pub fn require(&self, path: &str) -> Result<(), PolicyDeniedError> {
        match self.classify(path) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(reason) => Err(PolicyDeniedError::new(path, reason)),
        }
    }

    /// Create a permissive policy that allows everything (for testing)
    pub fn allow_all() -> Self {
        Self {
            strict: false,
            deny: PatternMatcher::empty(),
            trusted: HashSet::new(),
            allow_roots: Vec::new(),
        }
    }

    /// Create a restrictive policy with no roots, no trusted paths, and
    /// strict checking on
    pub fn deny_all() -> Self {
        Self {
            strict: true,
            deny: PatternMatcher::empty(),
            trusted: HashSet::new(),
            allow_roots: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_with_roots(roots: &[&str]) -> FsPolicy {
        let config = FsAccessConfig {
            strict: true,
            allow: roots.iter().map(|s| s.to_string()).collect(),
            deny: vec![],
        };
        FsPolicy::new(&config).unwrap()
    }

    #[test]
    fn test_allow_all() {
        let policy = FsPolicy::allow_all();
        assert!(policy.classify("/etc/passwd").is_allowed());
        assert!(policy.classify("/anything/at/all").is_allowed());
    }

    #[test]
    fn test_deny_all() {
        let policy = FsPolicy::deny_all();
        assert!(policy.classify("/proj/src/app.ts").is_denied());
    }

    #[test]
    fn test_non_strict_bypasses_deny_patterns() {
        let config = FsAccessConfig {
            strict: false,
            allow: vec![],
            deny: vec!["**/.env".to_string()],
        };
        let policy = FsPolicy::new(&config).unwrap();
        assert!(policy.classify("/proj/.env").is_allowed());
    }

    #[test]
    fn test_allow_root_containment() {
        let policy = policy_with_roots(&["/proj"]);
        assert!(policy.classify("/proj").is_allowed());
        assert!(policy.classify("/proj/src/app.ts").is_allowed());
        assert!(policy.classify("/etc/passwd").is_denied());
        assert!(policy.classify("/proj-sibling/file").is_denied());
    }

    #[test]
    fn test_deny_overrides_allow_root() {
        let config = FsAccessConfig {
            strict: true,
            allow: vec!["/proj".to_string()],
            deny: vec!["**/.env".to_string()],
        };
        let policy = FsPolicy::new(&config).unwrap();

        assert!(policy.classify("/proj/src/app.ts").is_allowed());
        match policy.classify("/proj/.env") {
            AccessDecision::Denied(reason) => assert!(reason.contains("**/.env")),
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn test_deny_overrides_trusted() {
        let config = FsAccessConfig {
            strict: true,
            allow: vec![],
            deny: vec!["**/.env".to_string()],
        };
        let policy = FsPolicy::new(&config)
            .unwrap()
            .with_trusted_paths(["/srv/.env"]);

        assert!(policy.classify("/srv/.env").is_denied());
    }

    #[test]
    fn test_trusted_path_allowed_outside_roots() {
        let policy =
            policy_with_roots(&["/proj"]).with_trusted_paths(["/opt/toolchain/helper.js"]);

        assert!(policy.classify("/opt/toolchain/helper.js").is_allowed());
        assert!(policy.classify("/opt/toolchain/other.js").is_denied());
    }

    #[test]
    fn test_root_normalization() {
        let policy = policy_with_roots(&["/proj/packages/../"]);
        assert!(policy.classify("/proj/src/app.ts").is_allowed());
    }

    #[test]
    fn test_check_loading_access_fallback_for_missing() {
        let policy = policy_with_roots(&["/proj"]);
        // Nothing exists at this path, so the denial softens to fallback.
        let decision = policy.check_loading_access("/no/such/path/on/disk.js");
        assert!(decision.is_fallback());
    }

    #[test]
    fn test_check_loading_access_denies_existing() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, b"top secret").unwrap();

        let policy = policy_with_roots(&["/proj"]);
        let path = crate::paths::normalize_path(secret.to_str().unwrap());
        assert!(policy.check_loading_access(&path).is_denied());
    }

    #[test]
    fn test_loading_guard_maps_decisions() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, b"x").unwrap();
        let secret_path = crate::paths::normalize_path(secret.to_str().unwrap());

        let root = crate::paths::normalize_path(dir.path().to_str().unwrap());
        let allowed_policy = policy_with_roots(&[root.as_str()]);
        assert_eq!(allowed_policy.loading_guard(&secret_path), Ok(true));

        let denying_policy = policy_with_roots(&["/proj"]);
        let err = denying_policy.loading_guard(&secret_path).unwrap_err();
        assert_eq!(err.path, secret_path);

        assert_eq!(denying_policy.loading_guard("/proj-missing/x.js"), Ok(false));
    }
}
