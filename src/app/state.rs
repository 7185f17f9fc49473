//! Orchestrator session state: cached search results, the multi-select
//! set, and their invalidation rules.

use std::collections::HashSet;

use serde::Serialize;

use crate::remote::path::strip_base;

/// One search hit: display label plus its remote path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub label: String,
    pub remote_path: String,
}

/// Cached outcome of one search, reusable until invalidated.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub platform: String,
    pub base_dir: String,
    pub query: String,
    pub items: Vec<ResultItem>,
    pub limit: usize,
}

impl ResultSet {
    /// Build from the absolute paths a search returned, in discovery
    /// order. Labels are the paths with the base directory stripped.
    pub fn build(
        platform: String,
        base_dir: String,
        query: String,
        paths: Vec<String>,
        limit: usize,
    ) -> Self {
        let items = paths
            .into_iter()
            .map(|path| ResultItem {
                label: strip_base(&base_dir, &path),
                remote_path: path,
            })
            .collect();
        Self {
            platform,
            base_dir,
            query,
            items,
            limit,
        }
    }

    pub fn remote_path_of(&self, label: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.remote_path.as_str())
    }
}

/// Mutable state spanning the whole interactive run.
#[derive(Default)]
pub struct SessionState {
    pub platform: Option<String>,
    pub results: Option<ResultSet>,
    pub selection: HashSet<String>,
    pub multi_select: bool,
}

impl SessionState {
    /// Discard the cached ResultSet and everything scoped to it.
    pub fn invalidate_results(&mut self) {
        self.results = None;
        self.selection.clear();
        self.multi_select = false;
    }

    /// Leaving the current platform also drops its results.
    pub fn reset_platform(&mut self) {
        self.platform = None;
        self.invalidate_results();
    }

    /// Flip multi-select; turning it OFF clears the selection.
    /// Returns the new state.
    pub fn toggle_multi(&mut self) -> bool {
        self.multi_select = !self.multi_select;
        if !self.multi_select {
            self.selection.clear();
        }
        self.multi_select
    }

    /// Toggle one label's membership; returns whether it is now selected.
    pub fn toggle_selection(&mut self, label: &str) -> bool {
        if self.selection.remove(label) {
            false
        } else {
            self.selection.insert(label.to_string());
            true
        }
    }
}
