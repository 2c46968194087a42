//! URL-to-filesystem-path resolution
//!
//! The resolver works on forward-slash URL paths and produces normalized
//! absolute candidate paths for the access policy. Decoding failures are
//! never fatal: a path that does not percent-decode is treated as opaque
//! and resolved as-is, which at worst yields a failed lookup downstream.

use crate::paths;
use crate::resolve::alias::{AliasRule, apply_aliases};
use std::borrow::Cow;

/// Reserved prefix letting a request address an absolute filesystem path
/// outside the served root (still subject to the access policy).
pub const FS_PREFIX: &str = "/@fs/";

/// Reserved prefix for server-generated virtual endpoints; requests in
/// this namespace are never resolved against the filesystem.
pub const INTERNAL_PREFIX: &str = "/@internal/";

/// Query marker for module-graph-internal requests.
const IMPORT_QUERY: &str = "import";

/// Query marker for raw URL references (bypasses transform pipelines,
/// still subject to access control).
const RAW_QUERY: &str = "url";

/// Outcome of resolving a request URL against a served root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Normalized absolute candidate filesystem path.
    pub file_path: String,
    /// Set when an alias rule fired: the URL the outgoing request should
    /// carry so the file-server collaborator resolves the rewritten
    /// location. The caller mutates the request before delegating.
    pub rewritten_url: Option<String>,
}

fn split_url(url: &str) -> (&str, Option<&str>) {
    let without_fragment = url.split('#').next().unwrap_or(url);
    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

/// The path component of a URL, with query and fragment removed.
pub fn cleaned_path(url: &str) -> &str {
    split_url(url).0
}

/// Percent-decode a URL path. A malformed encoding falls back to the
/// original string rather than failing the request.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    match urlencoding::decode(path) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(path),
    }
}

/// Percent-encode a path for use in a request URL, preserving separators.
pub fn encode_url_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_query_flag(url: &str, flag: &str) -> bool {
    let (_, query) = split_url(url);
    query.is_some_and(|q| {
        q.split('&')
            .any(|pair| pair.split('=').next().unwrap_or(pair) == flag)
    })
}

/// True for module-graph-internal requests (`?import`).
pub fn is_import_request(url: &str) -> bool {
    has_query_flag(url, IMPORT_QUERY)
}

/// True for raw URL references (`?url`).
pub fn is_raw_url_request(url: &str) -> bool {
    has_query_flag(url, RAW_QUERY)
}

/// True for requests in the server-internal namespace.
pub fn is_internal_request(url: &str) -> bool {
    cleaned_path(url).starts_with(INTERNAL_PREFIX)
}

/// True when the escape-hatch prefix addresses an absolute path.
pub fn is_fs_request(url: &str) -> bool {
    cleaned_path(url).starts_with(FS_PREFIX)
}

/// Join a URL path under a served root, lexically normalized.
///
/// A trailing slash on the URL path survives the join so that
/// directory-request semantics stay visible to the collaborator.
pub fn join_with_root(served_root: &str, url_path: &str) -> String {
    let relative = url_path.trim_start_matches('/');
    let joined = format!("{}/{}", served_root.trim_end_matches('/'), relative);
    let mut candidate = paths::normalize_path(&joined);
    if url_path.ends_with('/') && !candidate.ends_with('/') {
        candidate.push('/');
    }
    candidate
}

fn strip_root_prefix<'a>(path: &'a str, served_root: &str) -> Option<&'a str> {
    let root = served_root.trim_end_matches('/');
    let rest = path.strip_prefix(root)?;
    rest.starts_with('/').then_some(rest)
}

/// Resolve a request URL to a candidate absolute path under `served_root`.
///
/// Returns `None` when this URL is not the resolver's to handle: directory
/// and `.html` requests (a later HTML stage owns those), scheme-relative
/// `//` shapes, internal-namespace requests, and `?import`-marked module
/// requests. Declining is not an error and carries no policy opinion.
pub fn resolve_request_path(
    raw_url: &str,
    served_root: &str,
    aliases: &[AliasRule],
) -> Option<ResolvedRequest> {
    let (raw_path, query) = split_url(raw_url);

    // A leading double slash would be read back as a scheme-relative URL.
    if raw_path.starts_with("//") {
        return None;
    }
    if is_internal_request(raw_url) || is_import_request(raw_url) {
        return None;
    }

    let decoded = decode_path(raw_path);
    if decoded.ends_with('/') || decoded.ends_with(".html") {
        return None;
    }

    let (resolved_path, rewritten) = match apply_aliases(&decoded, aliases) {
        Some(target) => {
            // An alias target already under the served root is re-rooted,
            // matching the non-rewritten case.
            let relative = match strip_root_prefix(&target, served_root) {
                Some(rest) => rest.to_string(),
                None => target,
            };
            (relative, true)
        }
        None => (decoded.into_owned(), false),
    };

    let file_path = join_with_root(served_root, &resolved_path);

    let rewritten_url = rewritten.then(|| {
        let leading = if resolved_path.starts_with('/') {
            Cow::Borrowed(resolved_path.as_str())
        } else {
            Cow::Owned(format!("/{resolved_path}"))
        };
        let mut url = encode_url_path(&leading);
        if let Some(q) = query {
            url.push('?');
            url.push_str(q);
        }
        url
    });

    Some(ResolvedRequest {
        file_path,
        rewritten_url,
    })
}

/// Unwrap an escape-hatch URL into the absolute filesystem path it names.
///
/// Strips the `/@fs` marker, percent-decodes, and drops a leading drive
/// marker so `/@fs/C:/Users/x` and `/@fs/Users/x` resolve uniformly.
pub fn fs_path_from_url(url: &str) -> String {
    let raw_path = cleaned_path(url);
    let tail = raw_path
        .strip_prefix(FS_PREFIX.trim_end_matches('/'))
        .unwrap_or(raw_path);
    let decoded = decode_path(tail);
    let without_drive = paths::strip_drive_prefix(&decoded);
    let mut path = paths::normalize_path(without_drive);
    if decoded.ends_with('/') && !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// The substituted request URL for an unwrapped escape-hatch request,
/// re-encoded, with the original query preserved.
pub fn fs_rewritten_url(url: &str) -> String {
    let (_, query) = split_url(url);
    let mut out = encode_url_path(&fs_path_from_url(url));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::alias::AliasRule;

    #[test]
    fn test_cleaned_path_strips_query_and_fragment() {
        assert_eq!(cleaned_path("/src/app.ts?import&t=123"), "/src/app.ts");
        assert_eq!(cleaned_path("/src/app.ts#section"), "/src/app.ts");
        assert_eq!(cleaned_path("/src/app.ts"), "/src/app.ts");
    }

    #[test]
    fn test_decode_path_fallback_on_malformed() {
        assert_eq!(decode_path("/a%20b.txt"), "/a b.txt");
        // Invalid UTF-8 after decoding falls back to the raw string.
        assert_eq!(decode_path("/a%ff%fe"), "/a%ff%fe");
    }

    #[test]
    fn test_query_markers() {
        assert!(is_import_request("/src/app.ts?import"));
        assert!(is_import_request("/src/app.ts?t=1&import=true"));
        assert!(!is_import_request("/src/app.ts?importer=x"));
        assert!(is_raw_url_request("/logo.svg?url"));
        assert!(!is_raw_url_request("/logo.svg"));
    }

    #[test]
    fn test_internal_and_fs_markers() {
        assert!(is_internal_request("/@internal/env.js"));
        assert!(!is_internal_request("/src/@internal-lookalike.js"));
        assert!(is_fs_request("/@fs/home/user/pkg/index.js"));
        assert!(!is_fs_request("/src/app.ts"));
    }

    #[test]
    fn test_join_with_root_collapses_traversal() {
        assert_eq!(
            join_with_root("/proj", "/src/../../../etc/passwd"),
            "/etc/passwd"
        );
        assert_eq!(join_with_root("/proj", "/src/app.ts"), "/proj/src/app.ts");
        assert_eq!(join_with_root("/", "/etc/hosts"), "/etc/hosts");
    }

    #[test]
    fn test_join_with_root_preserves_trailing_slash() {
        assert_eq!(join_with_root("/proj", "/src/"), "/proj/src/");
    }

    #[test]
    fn test_resolve_plain_request() {
        let resolved = resolve_request_path("/src/app.ts?t=1", "/proj", &[]).unwrap();
        assert_eq!(resolved.file_path, "/proj/src/app.ts");
        assert_eq!(resolved.rewritten_url, None);
    }

    #[test]
    fn test_resolve_declines_gated_shapes() {
        assert!(resolve_request_path("/src/", "/proj", &[]).is_none());
        assert!(resolve_request_path("/index.html", "/proj", &[]).is_none());
        assert!(resolve_request_path("//evil.example/x", "/proj", &[]).is_none());
        assert!(resolve_request_path("/@internal/env.js", "/proj", &[]).is_none());
        assert!(resolve_request_path("/src/app.ts?import", "/proj", &[]).is_none());
    }

    #[test]
    fn test_resolve_decodes_before_joining() {
        let resolved = resolve_request_path("/src/my%20file.ts", "/proj", &[]).unwrap();
        assert_eq!(resolved.file_path, "/proj/src/my file.ts");
    }

    #[test]
    fn test_alias_rewrite_inside_root_is_rerooted() {
        let aliases = vec![AliasRule::prefix("/~static/", "/proj/public/")];
        let resolved = resolve_request_path("/~static/logo.png", "/proj", &aliases).unwrap();
        assert_eq!(resolved.file_path, "/proj/public/logo.png");
        assert_eq!(
            resolved.rewritten_url.as_deref(),
            Some("/public/logo.png")
        );
    }

    #[test]
    fn test_alias_rewrite_reports_query() {
        let aliases = vec![AliasRule::prefix("/~static/", "/proj/public/")];
        let resolved =
            resolve_request_path("/~static/logo.png?v=2", "/proj", &aliases).unwrap();
        assert_eq!(
            resolved.rewritten_url.as_deref(),
            Some("/public/logo.png?v=2")
        );
    }

    #[test]
    fn test_no_op_alias_list_matches_direct_join() {
        let direct = resolve_request_path("/src/app.ts", "/proj", &[]).unwrap();
        assert_eq!(direct.file_path, join_with_root("/proj", "/src/app.ts"));
    }

    #[test]
    fn test_fs_path_round_trip() {
        assert_eq!(
            fs_path_from_url("/@fs/abs/secret.txt"),
            "/abs/secret.txt"
        );
        assert_eq!(
            fs_path_from_url("/@fs/home/user/linked-pkg/index.js?import"),
            "/home/user/linked-pkg/index.js"
        );
    }

    #[test]
    fn test_fs_path_strips_drive_marker() {
        assert_eq!(fs_path_from_url("/@fs/C:/Users/me/pkg/a.js"), "/Users/me/pkg/a.js");
    }

    #[test]
    fn test_fs_path_decodes() {
        assert_eq!(fs_path_from_url("/@fs/opt/my%20pkg/a.js"), "/opt/my pkg/a.js");
    }

    #[test]
    fn test_fs_rewritten_url_reencodes() {
        assert_eq!(
            fs_rewritten_url("/@fs/opt/my%20pkg/a.js?t=9"),
            "/opt/my%20pkg/a.js?t=9"
        );
    }
}
