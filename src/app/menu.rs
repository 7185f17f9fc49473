//! Vertical menu navigation state.
//!
//! Selection wraps, the scroll offset follows the selected row so it
//! stays inside the visible window.

use super::ui::NavCommand;
use super::view::MenuView;

/// What a navigation command did to the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// Confirm on the option at this index.
    Chosen(usize),
    BackRequested,
    ToggleMulti,
    StartBatch,
    Quit,
}

pub struct MenuState {
    title: String,
    options: Vec<String>,
    selected: usize,
    scroll: usize,
    visible_rows: usize,
    allow_back: bool,
    multi_controls: bool,
}

impl MenuState {
    pub fn new(title: impl Into<String>, options: Vec<String>, visible_rows: usize) -> Self {
        Self {
            title: title.into(),
            options,
            selected: 0,
            scroll: 0,
            visible_rows: visible_rows.max(1),
            allow_back: false,
            multi_controls: false,
        }
    }

    pub fn with_back(mut self, allow: bool) -> Self {
        self.allow_back = allow;
        self
    }

    pub fn with_multi_controls(mut self, allow: bool) -> Self {
        self.multi_controls = allow;
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Apply one command; returns the resulting event, if any.
    pub fn handle(&mut self, cmd: NavCommand) -> Option<MenuEvent> {
        match cmd {
            NavCommand::MoveUp => {
                let len = self.options.len();
                if len > 0 {
                    self.selected = (self.selected + len - 1) % len;
                    self.clamp_scroll();
                }
                None
            }
            NavCommand::MoveDown => {
                let len = self.options.len();
                if len > 0 {
                    self.selected = (self.selected + 1) % len;
                    self.clamp_scroll();
                }
                None
            }
            NavCommand::Confirm => {
                if self.options.is_empty() {
                    None
                } else {
                    Some(MenuEvent::Chosen(self.selected))
                }
            }
            NavCommand::Back if self.allow_back => Some(MenuEvent::BackRequested),
            NavCommand::ToggleMultiSelect if self.multi_controls => Some(MenuEvent::ToggleMulti),
            NavCommand::StartBatch if self.multi_controls => Some(MenuEvent::StartBatch),
            NavCommand::Quit => Some(MenuEvent::Quit),
            _ => None,
        }
    }

    fn clamp_scroll(&mut self) {
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + self.visible_rows {
            self.scroll = self.selected + 1 - self.visible_rows;
        }
    }

    pub fn view(&self) -> MenuView {
        MenuView {
            title: self.title.clone(),
            options: self.options.clone(),
            selected: self.selected,
            scroll: self.scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(n: usize, visible: usize) -> MenuState {
        let options = (0..n).map(|i| format!("opt{}", i)).collect();
        MenuState::new("t", options, visible)
    }

    #[test]
    fn selection_wraps_both_directions() {
        let mut m = menu(3, 3);
        m.handle(NavCommand::MoveUp);
        assert_eq!(m.selected(), 2);
        m.handle(NavCommand::MoveDown);
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn scroll_follows_selection() {
        let mut m = menu(10, 3);
        for _ in 0..4 {
            m.handle(NavCommand::MoveDown);
        }
        let v = m.view();
        assert_eq!(v.selected, 4);
        assert_eq!(v.scroll, 2);

        // Wrap to the top resets the window.
        for _ in 0..6 {
            m.handle(NavCommand::MoveDown);
        }
        assert_eq!(m.view().scroll, 0);
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn back_and_multi_are_gated() {
        let mut plain = menu(2, 2);
        assert_eq!(plain.handle(NavCommand::Back), None);
        assert_eq!(plain.handle(NavCommand::ToggleMultiSelect), None);
        assert_eq!(plain.handle(NavCommand::StartBatch), None);

        let mut full = menu(2, 2).with_back(true).with_multi_controls(true);
        assert_eq!(full.handle(NavCommand::Back), Some(MenuEvent::BackRequested));
        assert_eq!(
            full.handle(NavCommand::ToggleMultiSelect),
            Some(MenuEvent::ToggleMulti)
        );
        assert_eq!(full.handle(NavCommand::StartBatch), Some(MenuEvent::StartBatch));
    }

    #[test]
    fn confirm_reports_selected_index() {
        let mut m = menu(3, 3);
        m.handle(NavCommand::MoveDown);
        assert_eq!(m.handle(NavCommand::Confirm), Some(MenuEvent::Chosen(1)));
    }
}
