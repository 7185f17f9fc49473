//! Streaming download worker.
//!
//! Runs off the interactive loop; publishes progress over a watch channel
//! and observes the cancellation flag at block boundaries. After it
//! returns, the local path is either a complete file or does not exist
//! (a failed cleanup delete is reported without changing the outcome).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::notify::NotificationBus;
use crate::remote::{RemoteError, RemoteFs};

use super::control::TransferControl;
use super::progress::{SpeedWindow, TransferProgress, TransferState};

/// Bytes per read/write iteration. Cancellation latency is bounded by one
/// in-flight block read.
pub const BLOCK_SIZE: usize = 1024 * 1024;

/// Terminal result of one transfer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed { bytes: u64 },
    Cancelled,
    Failed,
}

/// Foreground view of a spawned worker.
pub struct TransferHandle {
    pub progress: watch::Receiver<TransferProgress>,
    pub control: TransferControl,
    pub done: JoinHandle<TransferOutcome>,
}

/// Spawn the transfer worker for one task.
pub fn spawn_download(
    fs: Arc<dyn RemoteFs>,
    remote_path: String,
    local_path: PathBuf,
    control: TransferControl,
    bus: NotificationBus,
) -> TransferHandle {
    let initial = TransferProgress {
        id: Uuid::new_v4().to_string(),
        remote_path: remote_path.clone(),
        local_path: local_path.to_string_lossy().to_string(),
        state: TransferState::Pending,
        total_bytes: 0,
        bytes_read: 0,
        speed_bps: 0,
        eta_secs: None,
    };
    let (tx, rx) = watch::channel(initial);

    let worker_control = control.clone();
    let done = tokio::spawn(async move {
        download(fs.as_ref(), &remote_path, &local_path, &worker_control, &tx, &bus).await
    });

    TransferHandle {
        progress: rx,
        control,
        done,
    }
}

/// Run one transfer to a terminal state. Never propagates an error to the
/// caller; every failure is reported on the bus.
pub async fn download(
    fs: &dyn RemoteFs,
    remote_path: &str,
    local_path: &Path,
    control: &TransferControl,
    progress: &watch::Sender<TransferProgress>,
    bus: &NotificationBus,
) -> TransferOutcome {
    let mut report = progress.borrow().clone();
    info!(id = %report.id, "Starting download: {} -> {}", remote_path, local_path.display());

    let total_bytes = match fs.stat(remote_path).await {
        Ok(info) => info.size,
        Err(e) => {
            warn!(id = %report.id, "Stat failed for {}: {}", remote_path, e);
            bus.error(format!("Download failed: {}", e));
            report.state = TransferState::Failed;
            let _ = progress.send_replace(report);
            return TransferOutcome::Failed;
        }
    };

    report.state = TransferState::Running;
    report.total_bytes = total_bytes;
    let _ = progress.send_replace(report.clone());

    let streamed = stream_blocks(
        fs,
        remote_path,
        local_path,
        total_bytes,
        control,
        progress,
        &mut report,
    )
    .await;

    match streamed {
        Ok(StreamEnd {
            bytes_read,
            cancelled: false,
        }) if total_bytes == 0 || bytes_read >= total_bytes => {
            let name = local_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| remote_path.to_string());
            bus.success(format!("Download complete: {}", name));
            report.state = TransferState::Succeeded;
            report.bytes_read = bytes_read;
            let _ = progress.send_replace(report);
            TransferOutcome::Completed { bytes: bytes_read }
        }
        Ok(StreamEnd {
            bytes_read,
            cancelled,
        }) => {
            if cancelled {
                info!(id = %report.id, "Download cancelled at {} bytes", bytes_read);
                bus.info("Download aborted by user");
                report.state = TransferState::Cancelled;
            } else {
                // EOF before the advertised size.
                bus.error(format!(
                    "Download failed: short read ({} of {} bytes)",
                    bytes_read, total_bytes
                ));
                report.state = TransferState::Failed;
            }
            remove_partial(local_path, bus, !cancelled).await;
            report.bytes_read = bytes_read;
            let _ = progress.send_replace(report);
            if cancelled {
                TransferOutcome::Cancelled
            } else {
                TransferOutcome::Failed
            }
        }
        Err(e) => {
            warn!(id = %report.id, "Download failed for {}: {}", remote_path, e);
            bus.error(format!("Download failed: {}", e));
            remove_partial(local_path, bus, true).await;
            report.state = TransferState::Failed;
            let _ = progress.send_replace(report);
            TransferOutcome::Failed
        }
    }
}

struct StreamEnd {
    bytes_read: u64,
    cancelled: bool,
}

async fn stream_blocks(
    fs: &dyn RemoteFs,
    remote_path: &str,
    local_path: &Path,
    total_bytes: u64,
    control: &TransferControl,
    progress: &watch::Sender<TransferProgress>,
    report: &mut TransferProgress,
) -> Result<StreamEnd, RemoteError> {
    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut remote = fs.open_read(remote_path).await?;
    let mut local = tokio::fs::File::create(local_path).await?;

    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut bytes_read = 0u64;
    let mut window = SpeedWindow::new(Instant::now());

    loop {
        // Cooperative cancellation point, once per block.
        if control.is_cancelled() {
            return Ok(StreamEnd {
                bytes_read,
                cancelled: true,
            });
        }

        let n = remote.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        local.write_all(&buffer[..n]).await?;
        bytes_read += n as u64;

        if window.sample(Instant::now(), bytes_read) {
            report.speed_bps = window.speed_bps();
            report.eta_secs = window.eta_secs(total_bytes.saturating_sub(bytes_read));
        }
        report.bytes_read = bytes_read;
        let _ = progress.send_replace(report.clone());
    }

    local.flush().await?;
    Ok(StreamEnd {
        bytes_read,
        cancelled: false,
    })
}

/// Delete the partial file left behind by a cancelled or failed transfer.
/// A failed delete is reported but does not change the task's outcome.
async fn remove_partial(local_path: &Path, bus: &NotificationBus, after_error: bool) {
    match tokio::fs::remove_file(local_path).await {
        Ok(()) => {
            if after_error {
                bus.info("Removed partial file after error");
            } else {
                bus.info("Removed partial file");
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No partial file to remove at {}", local_path.display());
        }
        Err(e) => {
            bus.error(format!("Failed to remove partial file: {}", e));
        }
    }
}
