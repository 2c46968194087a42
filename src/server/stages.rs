//! Serving pipeline stages
//!
//! Three middleware stages compose the resolver, the access policy, and
//! the file-server collaborator. They are wired public -> root -> raw-fs;
//! each declines to the inner service when the request is not its to
//! handle, and the innermost fallback answers 404 for anything left.
//!
//! Only the typed policy denial gets local handling (the 403 page). Any
//! other collaborator fault surfaces as a 500 with its message logged,
//! never silently converted into a denial or a fallthrough.

use crate::error::{PolicyDeniedError, ServeError};
use crate::resolve;
use crate::server::ServeContext;
use crate::server::deny_page;
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error, warn};

fn request_url(req: &Request) -> String {
    match req.uri().query() {
        Some(query) => format!("{}?{}", req.uri().path(), query),
        None => req.uri().path().to_string(),
    }
}

fn rewrite_request_uri(req: &mut Request, new_url: &str) {
    match new_url.parse::<Uri>() {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => warn!(url = new_url, error = %e, "rewritten URL did not parse; keeping original"),
    }
}

fn fault_response(stage: &str, err: &ServeError) -> Response {
    error!(stage, error = %err, "file server fault");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Public-directory stage.
///
/// Serves anything under the public assets directory unconditionally;
/// public assets are not sensitive, so the access policy is bypassed.
/// Declines import-marked, internal, and `?url`-marked requests so later
/// stages can transform them instead of serving the raw bytes.
pub async fn serve_public_files(
    State(ctx): State<Arc<ServeContext>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(public_dir) = ctx.public_dir.clone() else {
        return next.run(req).await;
    };

    let url = request_url(&req);
    if resolve::is_import_request(&url)
        || resolve::is_internal_request(&url)
        || resolve::is_raw_url_request(&url)
    {
        return next.run(req).await;
    }

    // Fast short-circuit: a URL absent from the snapshot cannot be an
    // existing public file, so skip the collaborator entirely.
    if let Some(index) = &ctx.public_files {
        let decoded = resolve::decode_path(resolve::cleaned_path(&url));
        if !index.contains(&decoded) {
            return next.run(req).await;
        }
    }

    let url_path = req.uri().path().to_string();
    let guard = |_: &str| -> Result<bool, PolicyDeniedError> { Ok(true) };
    match ctx.file_server.serve(&public_dir, &url_path, &guard).await {
        Ok(Some(response)) => response,
        Ok(None) => next.run(req).await,
        Err(err) => fault_response("public", &err),
    }
}

/// Project-root stage.
///
/// Resolves the URL against the project root (alias rewriting included)
/// and delegates to the collaborator with the access policy as the
/// per-path predicate.
pub async fn serve_root_files(
    State(ctx): State<Arc<ServeContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    let url = request_url(&req);

    // Escape-hatch URLs belong to the raw-fs stage.
    if resolve::is_fs_request(&url) {
        return next.run(req).await;
    }

    let Some(resolved) = resolve::resolve_request_path(&url, &ctx.root, &ctx.aliases) else {
        return next.run(req).await;
    };
    debug!(url = url.as_str(), candidate = resolved.file_path.as_str(), "root stage candidate");

    if let Some(new_url) = &resolved.rewritten_url {
        rewrite_request_uri(&mut req, new_url);
    }

    let url_path = req.uri().path().to_string();
    let guard = |path: &str| ctx.policy.loading_guard(path);
    match ctx.file_server.serve(&ctx.root, &url_path, &guard).await {
        Ok(Some(response)) => response,
        Ok(None) => next.run(req).await,
        Err(ServeError::Denied(denied)) => {
            warn!(path = denied.path.as_str(), reason = denied.reason.as_str(), "denied");
            deny_page::denied_response(&denied, ctx.policy.allow_roots(), &ctx.docs_url)
        }
        Err(err) => fault_response("root", &err),
    }
}

/// Raw-filesystem (escape-hatch) stage.
///
/// Active only for `/@fs/` URLs; the remainder of the path is an
/// absolute filesystem path served from the filesystem root, still
/// passing through the same access policy. Without the marker this
/// stage declines without consulting the policy at all.
pub async fn serve_raw_fs(
    State(ctx): State<Arc<ServeContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    let url = request_url(&req);
    if !resolve::is_fs_request(&url) {
        return next.run(req).await;
    }

    let new_url = resolve::fs_rewritten_url(&url);
    debug!(url = url.as_str(), rewritten = new_url.as_str(), "raw-fs request");
    rewrite_request_uri(&mut req, &new_url);

    let url_path = req.uri().path().to_string();
    let guard = |path: &str| ctx.policy.loading_guard(path);
    match ctx.file_server.serve("/", &url_path, &guard).await {
        Ok(Some(response)) => response,
        Ok(None) => next.run(req).await,
        Err(ServeError::Denied(denied)) => {
            warn!(path = denied.path.as_str(), reason = denied.reason.as_str(), "denied");
            deny_page::denied_response(&denied, ctx.policy.allow_roots(), &ctx.docs_url)
        }
        Err(err) => fault_response("raw-fs", &err),
    }
}
