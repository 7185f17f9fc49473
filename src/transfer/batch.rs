//! Batch task derivation and sequencing.
//!
//! Tasks run strictly one at a time over the single session; the queue
//! preserves result order, never selection-click order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::remote::path::local_dest;

/// One queued download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub label: String,
    pub remote_path: String,
    pub local_path: PathBuf,
}

/// Ordered download queue derived from a result list and a selection.
#[derive(Debug)]
pub struct BatchQueue {
    items: Vec<BatchItem>,
    next: usize,
}

impl BatchQueue {
    /// Intersect `items` (in their given order) with `selection`, mapping
    /// each label to its destination under `<dest_root>/<platform>/`.
    pub fn from_selection<'a, I>(
        items: I,
        selection: &HashSet<String>,
        dest_root: &Path,
        platform: &str,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let items = items
            .into_iter()
            .filter(|(label, _)| selection.contains(*label))
            .map(|(label, remote_path)| BatchItem {
                label: label.to_string(),
                remote_path: remote_path.to_string(),
                local_path: local_dest(dest_root, platform, label),
            })
            .collect();
        Self { items, next: 0 }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next task with its 1-based index, or `None` when drained.
    pub fn next_task(&mut self) -> Option<(usize, BatchItem)> {
        let item = self.items.get(self.next)?.clone();
        self.next += 1;
        Some((self.next, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preserves_result_order_not_selection_order() {
        let items = vec![
            ("r1", "/roms/ps1/r1"),
            ("r2", "/roms/ps1/r2"),
            ("r3", "/roms/ps1/r3"),
            ("r4", "/roms/ps1/r4"),
            ("r5", "/roms/ps1/r5"),
        ];
        // Clicked r4 before r2; queue still runs r2 first.
        let sel = selection(&["r4", "r2"]);
        let mut queue =
            BatchQueue::from_selection(items, &sel, Path::new("/tmp/dl"), "ps1");

        assert_eq!(queue.total(), 2);
        let (i1, t1) = queue.next_task().unwrap();
        let (i2, t2) = queue.next_task().unwrap();
        assert_eq!((i1, t1.label.as_str()), (1, "r2"));
        assert_eq!((i2, t2.label.as_str()), (2, "r4"));
        assert!(queue.next_task().is_none());
    }

    #[test]
    fn unselected_labels_are_dropped() {
        let items = vec![("a", "/r/a"), ("b", "/r/b")];
        let sel = selection(&["b", "ghost"]);
        let mut queue = BatchQueue::from_selection(items, &sel, Path::new("/d"), "ps1");

        assert_eq!(queue.total(), 1);
        assert_eq!(queue.next_task().unwrap().1.remote_path, "/r/b");
    }

    #[test]
    fn destination_follows_platform_and_label_path() {
        let items = vec![("disc1/a.bin", "/roms/ps1/disc1/a.bin")];
        let sel = selection(&["disc1/a.bin"]);
        let mut queue = BatchQueue::from_selection(items, &sel, Path::new("/dl"), "ps1");

        let (_, task) = queue.next_task().unwrap();
        assert_eq!(
            task.local_path,
            Path::new("/dl").join("ps1").join("disc1").join("a.bin")
        );
    }
}
