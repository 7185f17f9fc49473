//! Render-ready frame snapshots handed to the presentation collaborator.

use serde::Serialize;

use crate::notify::NotificationView;
use crate::transfer::TransferProgress;

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub title: String,
    pub options: Vec<String>,
    pub selected: usize,
    pub scroll: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardView {
    pub prompt: String,
    pub buffer: String,
    pub rows: Vec<Vec<String>>,
    /// (row, col) of the highlighted key.
    pub cursor: (usize, usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferView {
    pub title: String,
    pub progress: TransferProgress,
}

#[derive(Debug, Clone, Serialize)]
pub enum Screen {
    Menu(MenuView),
    Keyboard(KeyboardView),
    Transfer(TransferView),
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub screen: Screen,
    pub footer: Option<String>,
    pub notifications: Vec<NotificationView>,
}
