//! Static file serving collaborator
//!
//! The serving stages do not read bytes themselves; they delegate to a
//! [`FileServer`] configured with a served root and a per-path guard.
//! The guard is the only security input: `Ok(true)` means serve,
//! `Ok(false)` means decline without an opinion (the stage passes the
//! request on), and `Err` carries a typed policy denial the stage turns
//! into a 403.
//!
//! [`BasicFileServer`] is a deliberately small implementation: it maps
//! the request URL under the root, asks the guard, and streams the file
//! with a guessed content type. ETags, ranges, and compression belong to
//! a fuller collaborator behind the same trait.

use crate::error::{PolicyDeniedError, ServeError, ServeResult};
use crate::resolve;
use async_trait::async_trait;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::io::ErrorKind;
use std::path::Path;
use tracing::trace;

/// Per-path serving guard handed to a [`FileServer`].
pub type PathGuard<'a> = &'a (dyn Fn(&str) -> Result<bool, PolicyDeniedError> + Send + Sync);

/// A collaborator that serves file bytes for a URL path under a root.
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Serve the file addressed by `url_path` (the percent-encoded path
    /// component of the request URL) under `served_root`.
    ///
    /// Returns `Ok(None)` to decline (nothing servable at that path) so
    /// the caller can hand the request to the next stage. IO faults
    /// other than absence are returned as [`ServeError::Io`] and must
    /// not be converted into a denial.
    async fn serve(
        &self,
        served_root: &str,
        url_path: &str,
        guard: PathGuard<'_>,
    ) -> ServeResult<Option<Response>>;
}

/// Minimal [`FileServer`] backed by `tokio::fs`.
#[derive(Debug, Default)]
pub struct BasicFileServer;

#[async_trait]
impl FileServer for BasicFileServer {
    async fn serve(
        &self,
        served_root: &str,
        url_path: &str,
        guard: PathGuard<'_>,
    ) -> ServeResult<Option<Response>> {
        let decoded = resolve::decode_path(url_path);
        let candidate = resolve::join_with_root(served_root, &decoded);

        if !guard(&candidate)? {
            return Ok(None);
        }

        let metadata = match tokio::fs::metadata(&candidate).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServeError::Io(e)),
        };

        // Directory-vs-file disambiguation is not this layer's call;
        // directories are declined, not listed.
        if metadata.is_dir() {
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&candidate).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServeError::Io(e)),
        };

        trace!(path = candidate.as_str(), bytes = bytes.len(), "serving file");

        let mime = mime_guess::from_path(Path::new(&candidate)).first_or_octet_stream();
        let response =
            ([(header::CONTENT_TYPE, mime.essence_str().to_string())], bytes).into_response();
        Ok(Some(response))
    }
}
