//! Configuration module
//!
//! Handles loading and validating configuration from TOML files and
//! environment variables, and normalizing every configured path to the
//! absolute forward-slash form the rest of the crate operates on.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str, normalize_config};
pub use types::*;
