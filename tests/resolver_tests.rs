//! Request path resolver integration tests

use fsgate::resolve::{
    AliasRule, fs_path_from_url, fs_rewritten_url, is_fs_request, join_with_root,
    resolve_request_path,
};

#[test]
fn test_plain_resolution_matches_direct_join() {
    let resolved = resolve_request_path("/src/app.ts", "/proj", &[]).unwrap();
    assert_eq!(resolved.file_path, join_with_root("/proj", "/src/app.ts"));
    assert_eq!(resolved.rewritten_url, None);
}

#[test]
fn test_query_and_fragment_are_stripped() {
    let resolved = resolve_request_path("/src/app.ts?t=1#frag", "/proj", &[]).unwrap();
    assert_eq!(resolved.file_path, "/proj/src/app.ts");
}

#[test]
fn test_traversal_cannot_fake_containment() {
    // The candidate must collapse before any containment check sees it.
    let resolved = resolve_request_path("/src/../../etc/passwd", "/proj", &[]).unwrap();
    assert_eq!(resolved.file_path, "/etc/passwd");
}

#[test]
fn test_encoded_traversal_collapses_too() {
    let resolved = resolve_request_path("/src/%2E%2E/%2E%2E/etc/passwd", "/proj", &[]).unwrap();
    assert_eq!(resolved.file_path, "/etc/passwd");
}

#[test]
fn test_malformed_encoding_is_not_fatal() {
    let resolved = resolve_request_path("/src/a%ff%fe.js", "/proj", &[]).unwrap();
    assert_eq!(resolved.file_path, "/proj/src/a%ff%fe.js");
}

#[test]
fn test_gating_declines() {
    assert!(resolve_request_path("/dir/", "/proj", &[]).is_none());
    assert!(resolve_request_path("/page.html", "/proj", &[]).is_none());
    assert!(resolve_request_path("//host/share", "/proj", &[]).is_none());
    assert!(resolve_request_path("/@internal/env.js", "/proj", &[]).is_none());
    assert!(resolve_request_path("/mod.js?import", "/proj", &[]).is_none());
}

#[test]
fn test_alias_prefix_rewrite_and_reported_url() {
    let aliases = vec![AliasRule::prefix("/~assets/", "/static/")];
    let resolved = resolve_request_path("/~assets/logo.png?v=1", "/proj", &aliases).unwrap();
    assert_eq!(resolved.file_path, "/proj/static/logo.png");
    assert_eq!(resolved.rewritten_url.as_deref(), Some("/static/logo.png?v=1"));
}

#[test]
fn test_alias_target_under_root_is_rerooted() {
    let aliases = vec![AliasRule::prefix("/~pkg/", "/proj/node_modules/pkg/")];
    let resolved = resolve_request_path("/~pkg/index.js", "/proj", &aliases).unwrap();
    assert_eq!(resolved.file_path, "/proj/node_modules/pkg/index.js");
    // The reported URL is root-relative, matching the non-rewritten case.
    assert_eq!(
        resolved.rewritten_url.as_deref(),
        Some("/node_modules/pkg/index.js")
    );
}

#[test]
fn test_alias_order_first_match_wins() {
    let aliases = vec![
        AliasRule::prefix("/~x/", "/one/"),
        AliasRule::prefix("/~x/", "/two/"),
    ];
    let resolved = resolve_request_path("/~x/f.js", "/proj", &aliases).unwrap();
    assert_eq!(resolved.file_path, "/proj/one/f.js");
}

#[test]
fn test_regex_alias_capture_groups() {
    let aliases = vec![AliasRule::pattern("^/v(\\d+)/", "/versions/$1/").unwrap()];
    let resolved = resolve_request_path("/v42/api.js", "/proj", &aliases).unwrap();
    assert_eq!(resolved.file_path, "/proj/versions/42/api.js");
}

// =============================================================================
// Escape hatch
// =============================================================================

#[test]
fn test_escape_hatch_round_trip() {
    // An absolute path outside the project root survives the marker
    // round-trip unchanged.
    assert!(is_fs_request("/@fs/abs/secret.txt"));
    assert_eq!(fs_path_from_url("/@fs/abs/secret.txt"), "/abs/secret.txt");
}

#[test]
fn test_escape_hatch_linked_package_scenario() {
    let path = fs_path_from_url("/@fs/home/user/linked-pkg/index.js");
    assert_eq!(path, "/home/user/linked-pkg/index.js");
}

#[test]
fn test_escape_hatch_decodes_and_strips_drive() {
    assert_eq!(
        fs_path_from_url("/@fs/C:/Users/dev/my%20pkg/a.js"),
        "/Users/dev/my pkg/a.js"
    );
}

#[test]
fn test_escape_hatch_rewritten_url_keeps_query() {
    assert_eq!(
        fs_rewritten_url("/@fs/opt/pkg/a.js?import&t=1"),
        "/opt/pkg/a.js?import&t=1"
    );
}

#[test]
fn test_non_marked_urls_do_not_engage_the_hatch() {
    assert!(!is_fs_request("/src/@fs-lookalike/a.js"));
    assert!(!is_fs_request("/abs/secret.txt"));
}
