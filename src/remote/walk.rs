//! Iterative depth-first traversal of the remote tree.
//!
//! Explicit stack, so recursion depth is never tied to remote tree depth.
//! Symlinks are skipped entirely and a visited set guards against a
//! directory path ever being yielded twice.

use std::collections::HashSet;

use crate::notify::NotificationBus;

use super::fs::{EntryKind, RemoteFs};
use super::path::join_remote_path;

/// One directory visit: the directory itself plus its partitioned entries.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub dir: String,
    pub subdirs: Vec<String>,
    pub files: Vec<String>,
}

/// Lazy pre-order walker. Call [`Walker::next`] until it returns `None`.
pub struct Walker<'a> {
    fs: &'a dyn RemoteFs,
    bus: &'a NotificationBus,
    stack: Vec<String>,
    visited: HashSet<String>,
}

impl<'a> Walker<'a> {
    pub fn new(fs: &'a dyn RemoteFs, bus: &'a NotificationBus, top: impl Into<String>) -> Self {
        Self {
            fs,
            bus,
            stack: vec![top.into()],
            visited: HashSet::new(),
        }
    }

    /// Next directory in pre-order, or `None` when the tree is exhausted.
    ///
    /// A listing failure abandons that subtree (with a notification) and
    /// moves on to the remaining stack.
    pub async fn next(&mut self) -> Option<WalkEntry> {
        while let Some(dir) = self.stack.pop() {
            if !self.visited.insert(dir.clone()) {
                continue;
            }

            let entries = match self.fs.read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    self.bus.error(format!("Cannot access {}: {}", dir, e));
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            let mut files = Vec::new();
            for entry in entries {
                match entry.kind {
                    // Never classified as file or directory; guarantees
                    // termination on cyclic link structures.
                    EntryKind::Symlink => {}
                    EntryKind::Directory => subdirs.push(entry.name),
                    EntryKind::File | EntryKind::Unknown => files.push(entry.name),
                }
            }

            // Reverse push so the first subdir is visited first.
            for d in subdirs.iter().rev() {
                self.stack.push(join_remote_path(&dir, d));
            }

            return Some(WalkEntry { dir, subdirs, files });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::remote::fs::{EntryInfo, RemoteError, RemoteReader};

    use super::*;

    #[derive(Default)]
    struct FakeFs {
        dirs: HashMap<String, Vec<EntryInfo>>,
        failing: HashSet<String>,
    }

    impl FakeFs {
        fn dir(mut self, path: &str, entries: Vec<(&str, EntryKind)>) -> Self {
            let infos = entries
                .into_iter()
                .map(|(name, kind)| EntryInfo {
                    name: name.to_string(),
                    path: join_remote_path(path, name),
                    kind,
                    size: 0,
                })
                .collect();
            self.dirs.insert(path.to_string(), infos);
            self
        }

        fn failing(mut self, path: &str) -> Self {
            self.failing.insert(path.to_string());
            self
        }
    }

    #[async_trait]
    impl RemoteFs for FakeFs {
        async fn read_dir(&self, path: &str) -> Result<Vec<EntryInfo>, RemoteError> {
            if self.failing.contains(path) {
                return Err(RemoteError::Protocol("listing failed".into()));
            }
            self.dirs
                .get(path)
                .cloned()
                .ok_or_else(|| RemoteError::NotFound(path.to_string()))
        }

        async fn stat(&self, path: &str) -> Result<EntryInfo, RemoteError> {
            Err(RemoteError::NotFound(path.to_string()))
        }

        async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError> {
            Err(RemoteError::NotFound(path.to_string()))
        }
    }

    async fn collect(fs: &FakeFs, top: &str) -> (Vec<String>, NotificationBus) {
        let bus = NotificationBus::new();
        let mut walker = Walker::new(fs, &bus, top);
        let mut dirs = Vec::new();
        while let Some(entry) = walker.next().await {
            dirs.push(entry.dir);
        }
        (dirs, bus)
    }

    #[tokio::test]
    async fn preorder_depth_first() {
        let fs = FakeFs::default()
            .dir(
                "/r",
                vec![("a", EntryKind::Directory), ("b", EntryKind::Directory)],
            )
            .dir("/r/a", vec![("a1", EntryKind::Directory)])
            .dir("/r/a/a1", vec![("f", EntryKind::File)])
            .dir("/r/b", vec![]);

        let (dirs, _) = collect(&fs, "/r").await;
        assert_eq!(dirs, vec!["/r", "/r/a", "/r/a/a1", "/r/b"]);
    }

    #[tokio::test]
    async fn symlinks_are_neither_files_nor_dirs() {
        let fs = FakeFs::default().dir(
            "/r",
            vec![
                ("link", EntryKind::Symlink),
                ("f.bin", EntryKind::File),
                ("d", EntryKind::Directory),
            ],
        )
        .dir("/r/d", vec![]);

        let bus = NotificationBus::new();
        let mut walker = Walker::new(&fs, &bus, "/r");
        let entry = walker.next().await.unwrap();
        assert_eq!(entry.files, vec!["f.bin"]);
        assert_eq!(entry.subdirs, vec!["d"]);
    }

    #[tokio::test]
    async fn duplicate_paths_yield_once() {
        // Same subdir name twice in one listing produces the same path.
        let fs = FakeFs::default()
            .dir(
                "/r",
                vec![("x", EntryKind::Directory), ("x", EntryKind::Directory)],
            )
            .dir("/r/x", vec![]);

        let (dirs, _) = collect(&fs, "/r").await;
        assert_eq!(dirs, vec!["/r", "/r/x"]);
    }

    #[tokio::test]
    async fn failed_subtree_is_abandoned_siblings_continue() {
        let fs = FakeFs::default()
            .dir(
                "/r",
                vec![("bad", EntryKind::Directory), ("good", EntryKind::Directory)],
            )
            .failing("/r/bad")
            .dir("/r/good", vec![("g", EntryKind::File)]);

        let (dirs, bus) = collect(&fs, "/r").await;
        assert_eq!(dirs, vec!["/r", "/r/good"]);
        assert_eq!(bus.len(), 1);
    }
}
