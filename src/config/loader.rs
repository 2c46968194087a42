//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (FSGATE_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::PatternMatcher;
use crate::config::types::{AppConfig, compile_aliases};
use crate::error::ConfigError;
use crate::paths;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "fsgate.toml",
    ".fsgate.toml",
    "~/.config/fsgate/config.toml",
    "/etc/fsgate/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Defaults are handled by serde defaults on AppConfig

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with FSGATE_ prefix
    // e.g., FSGATE_SERVER__PORT, FSGATE_FS__STRICT
    // Double underscore (__) maps to nested keys (server.port)
    builder = builder.add_source(
        Environment::with_prefix("FSGATE")
            .separator("__")
            .try_parsing(true),
    );

    // Build and deserialize
    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Missing {
            field: "root".to_string(),
        });
    }

    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    // Compile every pattern up front so a bad rule fails at startup, not
    // on the first request that happens to touch it.
    PatternMatcher::new(&config.fs.deny)?;
    compile_aliases(&config.aliases)?;

    Ok(())
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && bytes[2] == b'/')
}

fn absolutize(base: &str, path: &str) -> String {
    let normalized = paths::normalize_path(path);
    if is_absolute(&normalized) {
        normalized
    } else {
        paths::normalize_path(&format!("{base}/{normalized}"))
    }
}

/// Resolve every configured path to normalized absolute form.
///
/// The decision engine and resolver require pre-normalized absolute
/// forward-slash paths; this is the single place raw configuration is
/// brought into that form. Relative roots resolve against the working
/// directory, the public dir and allow roots against the project root,
/// and an empty allow list defaults to the project root itself.
pub fn normalize_config(config: &mut AppConfig) -> Result<(), ConfigError> {
    let cwd = std::env::current_dir()?;
    let cwd = paths::normalize_path(&cwd.to_string_lossy());

    config.root = absolutize(&cwd, &config.root);

    if !config.public_dir.is_empty() {
        config.public_dir = absolutize(&config.root, &config.public_dir);
    }

    if config.fs.allow.is_empty() {
        config.fs.allow = vec![config.root.clone()];
    } else {
        config.fs.allow = config
            .fs
            .allow
            .iter()
            .map(|entry| absolutize(&config.root, entry))
            .collect();
    }

    Ok(())
}
