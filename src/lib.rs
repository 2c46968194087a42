//! fsgate - development file server with path-based access control
//!
//! The file-serving access-control layer of a development server: for
//! every request that may resolve to a filesystem path, fsgate decides
//! whether that path may be read and returned to the client.
//!
//! ## Features
//!
//! - **Fixed-order path policy** - deny globs veto, trusted paths
//!   fast-path, allow roots contain, default deny
//! - **Three serving stages** - public assets, project root (with alias
//!   rewriting), and a `/@fs/` escape hatch for absolute paths outside
//!   the root, composed as axum middleware
//! - **Existence-aware decisions** - a denied path that does not exist
//!   falls through to later handlers instead of 403ing legitimate API
//!   routes
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Policy Model
//!
//! ```text
//! strict bypass -> deny patterns -> trusted paths -> allow roots -> deny
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! root = "/home/me/project"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 18180
//!
//! [fs]
//! strict = true
//! allow = [".", "../shared-libs"]
//! deny = ["**/.env", "**/.env.*", "**/.git/**"]
//!
//! [[alias]]
//! find = "/~assets/"
//! replacement = "/static/"
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod paths;
pub mod resolve;
pub mod server;
pub mod util;

// Re-export main types
pub use access_control::{AccessDecision, FsPolicy, LoadDecision};
pub use config::{AppConfig, load_config};
pub use error::{AppError, PolicyDeniedError, Result, ServeError};
pub use server::{BasicFileServer, FileServer, PublicFileIndex, ServeContext, build_router};
