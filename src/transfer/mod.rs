//! Streaming download engine: cancellation control, progress telemetry,
//! the block-transfer worker, and batch sequencing.

pub mod batch;
pub mod control;
pub mod engine;
pub mod progress;

pub use batch::{BatchItem, BatchQueue};
pub use control::TransferControl;
pub use engine::{download, spawn_download, TransferHandle, TransferOutcome, BLOCK_SIZE};
pub use progress::{SpeedWindow, TransferProgress, TransferState, SPEED_EPSILON};
