//! Seam between the orchestrator and its input/presentation collaborators.

use async_trait::async_trait;

use super::view::Frame;

/// Abstract navigation command, already debounced and mapped from raw
/// hardware events by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Confirm,
    Back,
    ToggleMultiSelect,
    StartBatch,
    Quit,
}

/// Input source plus render sink.
#[async_trait]
pub trait Ui: Send {
    /// Next command. Must be cancel-safe: the orchestrator polls this
    /// inside `select!` alongside ticks and worker completion. `None`
    /// means the input source is gone and is treated as Quit.
    async fn next_command(&mut self) -> Option<NavCommand>;

    /// Render one frame snapshot.
    fn present(&mut self, frame: &Frame);

    /// Menu rows that fit on screen.
    fn visible_rows(&self) -> usize {
        15
    }
}
