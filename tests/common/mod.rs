//! Shared test doubles: an in-memory remote tree and a scripted UI.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;

use async_trait::async_trait;

use romfetch::app::ui::{NavCommand, Ui};
use romfetch::app::view::{Frame, Screen};
use romfetch::remote::path::join_remote_path;
use romfetch::remote::{EntryInfo, EntryKind, RemoteError, RemoteFs, RemoteReader};

/// In-memory remote tree. Directory listings preserve registration order.
pub struct MemFs {
    dirs: HashMap<String, Vec<EntryInfo>>,
    files: HashMap<String, Vec<u8>>,
}

impl MemFs {
    /// Build from `(absolute_path, size)` file entries. Intermediate
    /// directories are created implicitly, in first-seen order.
    pub fn new(files: &[(&str, usize)]) -> Self {
        let mut fs = Self {
            dirs: HashMap::new(),
            files: HashMap::new(),
        };
        for (i, (path, size)) in files.iter().enumerate() {
            fs.register(path, vec![(i % 251) as u8; *size]);
        }
        fs
    }

    /// Drop a file's content while leaving it listed, so stat/open fail.
    pub fn remove_file_data(&mut self, path: &str) {
        self.files.remove(path);
    }

    fn register(&mut self, path: &str, data: Vec<u8>) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut dir = String::from("/");
        for (depth, segment) in segments.iter().enumerate() {
            let child_path = join_remote_path(&dir, segment);
            let is_file = depth == segments.len() - 1;
            let children = self.dirs.entry(dir.clone()).or_default();
            if !children.iter().any(|e| e.name == *segment) {
                children.push(EntryInfo {
                    name: segment.to_string(),
                    path: child_path.clone(),
                    kind: if is_file {
                        EntryKind::File
                    } else {
                        EntryKind::Directory
                    },
                    size: if is_file { data.len() as u64 } else { 0 },
                });
            }
            if is_file {
                self.files.insert(child_path.clone(), data.clone());
            } else {
                self.dirs.entry(child_path.clone()).or_default();
            }
            dir = child_path;
        }
    }
}

#[async_trait]
impl RemoteFs for MemFs {
    async fn read_dir(&self, path: &str) -> Result<Vec<EntryInfo>, RemoteError> {
        self.dirs
            .get(path.trim_end_matches('/'))
            .or_else(|| self.dirs.get(path))
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    async fn stat(&self, path: &str) -> Result<EntryInfo, RemoteError> {
        let data = self
            .files
            .get(path)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        Ok(EntryInfo {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            size: data.len() as u64,
        })
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError> {
        let data = self
            .files
            .get(path)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }
}

/// One scripted input step.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Delivered while any non-transfer screen is up.
    Cmd(NavCommand),
    /// Delivered only while the transfer screen is up (e.g. cancel).
    DuringTransfer(NavCommand),
}

/// Replays a fixed command script and records every presented frame.
/// Scripts must end by quitting or choosing Exit; an exhausted script
/// parks the input forever, so tests run under a timeout.
pub struct ScriptedUi {
    steps: VecDeque<Step>,
    pub frames: Vec<Frame>,
    in_transfer: bool,
}

impl ScriptedUi {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            frames: Vec::new(),
            in_transfer: false,
        }
    }

    /// Consecutive-deduplicated titles of all transfer frames, in order.
    pub fn transfer_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for frame in &self.frames {
            if let Screen::Transfer(t) = &frame.screen {
                if titles.last().map(|s| s.as_str()) != Some(t.title.as_str()) {
                    titles.push(t.title.clone());
                }
            }
        }
        titles
    }

    pub fn menu_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for frame in &self.frames {
            if let Screen::Menu(m) = &frame.screen {
                if titles.last().map(|s| s.as_str()) != Some(m.title.as_str()) {
                    titles.push(m.title.clone());
                }
            }
        }
        titles
    }

    pub fn saw_notification(&self, message: &str) -> bool {
        self.frames
            .iter()
            .any(|f| f.notifications.iter().any(|n| n.message == message))
    }
}

#[async_trait]
impl Ui for ScriptedUi {
    async fn next_command(&mut self) -> Option<NavCommand> {
        let applies = match self.steps.front() {
            Some(Step::Cmd(_)) => !self.in_transfer,
            Some(Step::DuringTransfer(_)) => self.in_transfer,
            None => false,
        };
        if applies {
            if let Some(Step::Cmd(cmd) | Step::DuringTransfer(cmd)) = self.steps.pop_front() {
                return Some(cmd);
            }
        }
        // Step does not apply to the current screen (or the script is
        // exhausted); the orchestrator's tick/worker branches keep the
        // loop moving.
        std::future::pending().await
    }

    fn present(&mut self, frame: &Frame) {
        self.in_transfer = matches!(frame.screen, Screen::Transfer(_));
        if !self.in_transfer {
            // A transfer that finished before its scripted command landed
            // leaves the step stale; drop it so the flow stays deterministic.
            while matches!(self.steps.front(), Some(Step::DuringTransfer(_))) {
                self.steps.pop_front();
            }
        }
        self.frames.push(frame.clone());
    }

    fn visible_rows(&self) -> usize {
        10
    }
}
