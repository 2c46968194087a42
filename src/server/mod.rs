//! Serving orchestration
//!
//! Assembles the access policy, the request resolver, and the
//! file-server collaborator into a middleware pipeline:
//!
//! ```text
//! request -> public stage -> root stage -> raw-fs stage -> 404
//! ```
//!
//! Each stage declines when the request is not its to handle; the
//! innermost fallback stands in for whatever later middleware (an API
//! router, an HTML transform) the hosting server would wire behind the
//! file-serving layer.

pub mod deny_page;
pub mod public_files;
pub mod stages;
pub mod static_files;

pub use public_files::PublicFileIndex;
pub use static_files::{BasicFileServer, FileServer, PathGuard};

use crate::access_control::FsPolicy;
use crate::resolve::AliasRule;
use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Default documentation reference shown on the 403 page.
pub const DEFAULT_DOCS_URL: &str = "https://github.com/fsgate/fsgate#allowing-paths";

/// Read-only state shared by every serving stage.
///
/// Built once at server start; request handling never mutates it, so a
/// plain `Arc` is enough for concurrent access.
pub struct ServeContext {
    pub policy: Arc<FsPolicy>,
    /// Project root, normalized absolute.
    pub root: String,
    /// Public assets directory, normalized absolute, if configured.
    pub public_dir: Option<String>,
    pub aliases: Vec<AliasRule>,
    pub file_server: Arc<dyn FileServer>,
    pub public_files: Option<Arc<PublicFileIndex>>,
    pub docs_url: String,
}

impl ServeContext {
    pub fn new(policy: Arc<FsPolicy>, root: impl Into<String>) -> Self {
        Self {
            policy,
            root: root.into(),
            public_dir: None,
            aliases: Vec::new(),
            file_server: Arc::new(BasicFileServer),
            public_files: None,
            docs_url: DEFAULT_DOCS_URL.to_string(),
        }
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<String>) -> Self {
        self.public_dir = Some(public_dir.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<AliasRule>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_file_server(mut self, file_server: Arc<dyn FileServer>) -> Self {
        self.file_server = file_server;
        self
    }

    pub fn with_public_files(mut self, index: Arc<PublicFileIndex>) -> Self {
        self.public_files = Some(index);
        self
    }

    pub fn with_docs_url(mut self, docs_url: impl Into<String>) -> Self {
        self.docs_url = docs_url.into();
        self
    }
}

async fn fallthrough() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build the serving router.
///
/// Layers run outermost-first, so they are added innermost-first here:
/// the fallback 404, then raw-fs, root, and public stages, with tracing
/// and permissive CORS (a development server) on the outside.
pub fn build_router(ctx: Arc<ServeContext>) -> Router {
    Router::new()
        .fallback(fallthrough)
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            stages::serve_raw_fs,
        ))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            stages::serve_root_files,
        ))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            stages::serve_public_files,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
