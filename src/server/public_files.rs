//! Known-public-files snapshot
//!
//! A one-shot scan of the public assets directory, used by the public
//! serving stage to skip the file-server collaborator for URLs that
//! cannot correspond to an existing public file. The snapshot is a
//! performance device only; it never influences an access decision.
//!
//! Readers always see a consistent snapshot: the set lives behind an
//! `Arc` that is swapped wholesale on rebuild (a restart-boundary
//! operation), never mutated while requests are in flight.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::debug;
use walkdir::WalkDir;

/// Snapshot of URL paths (`/logo.png`, `/fonts/inter.woff2`) that exist
/// under the public directory.
pub struct PublicFileIndex {
    files: RwLock<Arc<HashSet<String>>>,
}

impl PublicFileIndex {
    /// Walk `public_dir` and build the snapshot.
    pub fn scan(public_dir: &str) -> Self {
        let index = Self {
            files: RwLock::new(Arc::new(HashSet::new())),
        };
        index.rebuild(public_dir);
        index
    }

    /// Re-walk the directory and publish a fresh snapshot atomically.
    pub fn rebuild(&self, public_dir: &str) {
        let mut files = HashSet::new();
        for entry in WalkDir::new(public_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            if let Ok(relative) = entry.path().strip_prefix(public_dir) {
                let url_path = format!("/{}", relative.to_string_lossy().replace('\\', "/"));
                files.insert(url_path);
            }
        }
        debug!(dir = public_dir, count = files.len(), "public file snapshot built");

        let mut guard = self.files.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(files);
    }

    /// Whether a decoded URL path names a known public file.
    pub fn contains(&self, url_path: &str) -> bool {
        self.snapshot().contains(url_path)
    }

    /// Number of files in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<HashSet<String>> {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
