//! Denial response rendering
//!
//! Builds the 403 response for policy-denied paths. The body names the
//! denied path and lists the configured allow roots so operators can
//! diagnose a misconfiguration, and every interpolated string is
//! HTML-escaped: request paths are attacker-controlled and must not be
//! reflected verbatim.

use crate::error::PolicyDeniedError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Escape text for safe interpolation into an HTML body.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the 403 response for a denied path.
pub fn denied_response(
    denied: &PolicyDeniedError,
    allow_roots: &[String],
    docs_url: &str,
) -> Response {
    let roots = allow_roots
        .iter()
        .map(|root| format!("<li><code>{}</code></li>", html_escape(root)))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>403 Restricted</title></head>\n<body>\n\
         <h1>403 Restricted</h1>\n\
         <p>The request path <code>{path}</code> is {reason}.</p>\n\
         <p>Paths below these roots are servable:</p>\n\
         <ul>\n{roots}\n</ul>\n\
         <p>Refer to <a href=\"{docs}\">the documentation</a> to adjust the allow list.</p>\n\
         </body>\n</html>\n",
        path = html_escape(&denied.path),
        reason = html_escape(&denied.reason),
        roots = roots,
        docs = html_escape(docs_url),
    );

    (StatusCode::FORBIDDEN, Html(body)).into_response()
}
