//! Platform listing and substring search over the remote tree.

use crate::notify::NotificationBus;

use super::fs::{EntryKind, RemoteError, RemoteFs};
use super::path::join_remote_path;
use super::walk::Walker;

/// Traversal stops once this many matches have been collected.
pub const SEARCH_LIMIT: usize = 2000;

/// Immediate children of the remote root whose attribute bits mark them
/// as directories, in listing order.
pub async fn list_platforms(
    fs: &dyn RemoteFs,
    root: &str,
) -> Result<Vec<String>, RemoteError> {
    let entries = fs.read_dir(root).await?;
    Ok(entries
        .into_iter()
        .filter(|e| e.kind == EntryKind::Directory)
        .map(|e| e.name)
        .collect())
}

/// Case-insensitive substring search over file names below `base_dir`,
/// collected in walk (discovery) order.
///
/// A blank or whitespace-only query yields an empty result by policy, not
/// as an error. Traversal stops as soon as `limit` matches are collected.
pub async fn search(
    fs: &dyn RemoteFs,
    bus: &NotificationBus,
    base_dir: &str,
    query: &str,
    limit: usize,
) -> Vec<String> {
    let q = query.trim().to_lowercase();
    let mut results = Vec::new();
    if q.is_empty() {
        return results;
    }

    let mut walker = Walker::new(fs, bus, base_dir);
    while let Some(entry) = walker.next().await {
        for fname in &entry.files {
            if fname.to_lowercase().contains(&q) {
                results.push(join_remote_path(&entry.dir, fname));
                if results.len() >= limit {
                    return results;
                }
            }
        }
    }
    results
}
