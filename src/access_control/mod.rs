//! Access control module
//!
//! Decides, for every request that may resolve to a filesystem path,
//! whether that path may be read and returned to the client.
//!
//! ## Policy Model
//!
//! A [`FsPolicy`] is evaluated in a fixed order:
//!
//! 1. **Strict bypass** - if strict mode is off, everything is allowed
//! 2. **Deny patterns** - glob patterns; a match is an absolute veto that
//!    overrides every rule below
//! 3. **Trusted paths** - paths the server itself resolved (not
//!    user-supplied) are allowed without further checks
//! 4. **Allow roots** - a path equal to or below any allowed root is
//!    allowed
//! 5. **Default deny**
//!
//! The order must not change: deny is a veto, trusted paths are a
//! fast-path for internally generated references, allow roots are the
//! general rule.
//!
//! ## Example Configuration
//!
//! ```toml
//! [fs]
//! strict = true
//! allow = ["/home/me/project", "/home/me/shared-libs"]
//! deny = ["**/.env", "**/.env.*", "**/.git/**"]
//! ```
//!
//! Policy evaluation itself is pure and does no disk I/O. The
//! existence-aware [`LoadDecision`] layered on top by
//! [`FsPolicy::check_loading_access`] is what turns "denied" into either
//! an explicit 403 (the file is real) or a fallthrough to other handlers
//! (nothing exists there, so the URL may be an API route).

pub mod patterns;
pub mod policy;
pub mod types;

pub use patterns::PatternMatcher;
pub use policy::FsPolicy;
pub use types::{AccessDecision, LoadDecision};
