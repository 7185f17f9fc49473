//! Virtual keyboard for query entry, driven by directional commands.

use super::ui::NavCommand;
use super::view::KeyboardView;

const CHAR_ROWS: [&str; 4] = ["ABCDEFGHIJ", "KLMNOPQRST", "UVWXYZ0123", "456789-_.<"];
const SPACE: &str = "SPACE";
const ENTER: &str = "ENTER";
const BACKSPACE: &str = "BACK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// ENTER pressed; the trimmed buffer.
    Submitted(String),
    /// Back pressed; abandon query entry.
    Cancelled,
    Quit,
}

pub struct KeyboardState {
    prompt: String,
    rows: Vec<Vec<String>>,
    row: usize,
    col: usize,
    buffer: String,
}

impl KeyboardState {
    pub fn new(prompt: impl Into<String>) -> Self {
        let mut rows: Vec<Vec<String>> = CHAR_ROWS
            .iter()
            .map(|r| r.chars().map(|c| c.to_string()).collect())
            .collect();
        rows.push(vec![SPACE.to_string(), ENTER.to_string(), BACKSPACE.to_string()]);
        Self {
            prompt: prompt.into(),
            rows,
            row: 0,
            col: 0,
            buffer: String::new(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle(&mut self, cmd: NavCommand) -> Option<KeyboardEvent> {
        match cmd {
            NavCommand::MoveUp => {
                self.row = self.row.saturating_sub(1);
                self.clamp_col();
                None
            }
            NavCommand::MoveDown => {
                self.row = (self.row + 1).min(self.rows.len() - 1);
                self.clamp_col();
                None
            }
            NavCommand::MoveLeft => {
                self.col = self.col.saturating_sub(1);
                None
            }
            NavCommand::MoveRight => {
                self.col = (self.col + 1).min(self.rows[self.row].len() - 1);
                None
            }
            NavCommand::Confirm => self.press_key(),
            NavCommand::Back => Some(KeyboardEvent::Cancelled),
            NavCommand::Quit => Some(KeyboardEvent::Quit),
            NavCommand::ToggleMultiSelect | NavCommand::StartBatch => None,
        }
    }

    fn press_key(&mut self) -> Option<KeyboardEvent> {
        let key = self.rows[self.row][self.col].as_str();
        match key {
            ENTER => Some(KeyboardEvent::Submitted(self.buffer.trim().to_string())),
            BACKSPACE => {
                self.buffer.pop();
                None
            }
            SPACE => {
                self.buffer.push(' ');
                None
            }
            _ => {
                self.buffer.push_str(key);
                None
            }
        }
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(self.rows[self.row].len() - 1);
    }

    pub fn view(&self) -> KeyboardView {
        KeyboardView {
            prompt: self.prompt.clone(),
            buffer: self.buffer.clone(),
            rows: self.rows.clone(),
            cursor: (self.row, self.col),
        }
    }
}
