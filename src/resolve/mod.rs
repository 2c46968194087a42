//! Request path resolution
//!
//! Turns an incoming URL into a candidate absolute filesystem path:
//! query/fragment stripping, percent-decoding (non-fatal on malformed
//! input), alias rewriting, and joining against a served root. Also
//! recognizes the reserved markers the serving stages gate on: the
//! `/@fs/` escape hatch, the `/@internal/` infrastructure namespace, and
//! the `?import` / `?url` query markers.

pub mod alias;
pub mod resolver;

pub use alias::{AliasMatcher, AliasRule, apply_aliases};
pub use resolver::{
    FS_PREFIX, INTERNAL_PREFIX, ResolvedRequest, cleaned_path, decode_path, encode_url_path,
    fs_path_from_url, fs_rewritten_url, is_fs_request, is_import_request, is_internal_request,
    is_raw_url_request, join_with_root, resolve_request_path,
};
