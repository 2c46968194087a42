//! Configuration types for fsgate
//!
//! This module defines the configuration structure that can be loaded
//! from TOML files and/or environment variables.

use crate::error::ConfigError;
use crate::resolve::AliasRule;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Project root directory served by the root stage
    pub root: String,

    /// Public assets directory, served without access checks. Relative
    /// paths are taken under `root`. Empty disables the public stage.
    pub public_dir: String,

    /// Filesystem access policy
    pub fs: FsAccessConfig,

    /// Alias rewrite rules, applied in order (first match wins)
    #[serde(default, rename = "alias")]
    pub aliases: Vec<AliasConfig>,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Documentation link shown on the 403 page
    pub docs_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            root: ".".to_string(),
            public_dir: "public".to_string(),
            fs: FsAccessConfig::default(),
            aliases: Vec::new(),
            logging: LoggingConfig::default(),
            docs_url: crate::server::DEFAULT_DOCS_URL.to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default: loopback)
    pub host: String,

    /// Port to bind
    pub port: u16,
}

/// Default port for the development server
pub const DEFAULT_PORT: u16 = 18180;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Filesystem access policy configuration
///
/// Evaluation order is fixed: deny patterns veto everything, trusted
/// paths (added programmatically, not configured) come next, then
/// allow-root containment, then default deny.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FsAccessConfig {
    /// When false, the policy is bypassed entirely
    pub strict: bool,

    /// Directories whose contents may be served. Relative entries are
    /// taken under the project root; an empty list defaults to the root
    /// itself.
    pub allow: Vec<String>,

    /// Glob patterns that forbid serving regardless of allow rules
    pub deny: Vec<String>,
}

impl Default for FsAccessConfig {
    fn default() -> Self {
        Self {
            strict: true,
            allow: Vec::new(),
            deny: vec![
                "**/.env".to_string(),
                "**/.env.*".to_string(),
                "**/*.{crt,pem}".to_string(),
                "**/.git/**".to_string(),
            ],
        }
    }
}

/// A single alias rewrite rule
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    /// Literal prefix, or a regex when `regex = true`
    pub find: String,

    /// Replacement text (`$1`-style captures available for regex rules)
    pub replacement: String,

    /// Interpret `find` as a regular expression
    #[serde(default)]
    pub regex: bool,
}

impl AliasConfig {
    /// Compile into the resolver's rule form.
    pub fn compile(&self) -> Result<AliasRule, ConfigError> {
        if self.regex {
            AliasRule::pattern(&self.find, self.replacement.clone())
        } else {
            Ok(AliasRule::prefix(self.find.clone(), self.replacement.clone()))
        }
    }
}

/// Compile every configured alias, in order.
pub fn compile_aliases(configs: &[AliasConfig]) -> Result<Vec<AliasRule>, ConfigError> {
    configs.iter().map(AliasConfig::compile).collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
