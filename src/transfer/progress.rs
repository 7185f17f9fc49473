//! Transfer progress telemetry.
//!
//! Speed and ETA are advisory presentation values recomputed over a
//! rolling window; they never drive control decisions.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Below this rate the ETA is reported as unknown instead of diverging.
pub const SPEED_EPSILON: f64 = 1e-6;

/// Transfer task state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// Snapshot published by the worker after each block.
#[derive(Debug, Clone, Serialize)]
pub struct TransferProgress {
    /// Unique transfer ID for log correlation
    pub id: String,
    pub remote_path: String,
    pub local_path: String,
    pub state: TransferState,
    pub total_bytes: u64,
    pub bytes_read: u64,
    /// Transfer speed in bytes/second
    pub speed_bps: u64,
    /// Estimated seconds remaining; `None` while the rate is unknown.
    pub eta_secs: Option<u64>,
}

impl TransferProgress {
    /// Progress ratio in 0.0..=1.0.
    pub fn ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            (self.bytes_read as f64 / self.total_bytes as f64).min(1.0)
        }
    }
}

/// Rolling measurement window for speed/ETA.
pub struct SpeedWindow {
    last_at: Instant,
    last_bytes: u64,
    speed_bps: f64,
}

impl SpeedWindow {
    /// Minimum elapsed time before the rate is recomputed.
    pub const MIN_WINDOW: Duration = Duration::from_millis(500);

    pub fn new(now: Instant) -> Self {
        Self {
            last_at: now,
            last_bytes: 0,
            speed_bps: 0.0,
        }
    }

    /// Record the running byte count; recomputes the rate once at least
    /// [`Self::MIN_WINDOW`] has elapsed. Returns whether it recomputed.
    pub fn sample(&mut self, now: Instant, bytes_read: u64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_at);
        if elapsed < Self::MIN_WINDOW {
            return false;
        }
        let delta = bytes_read.saturating_sub(self.last_bytes);
        self.speed_bps = delta as f64 / elapsed.as_secs_f64();
        self.last_bytes = bytes_read;
        self.last_at = now;
        true
    }

    pub fn speed_bps(&self) -> u64 {
        self.speed_bps.max(0.0) as u64
    }

    pub fn eta_secs(&self, remaining_bytes: u64) -> Option<u64> {
        if self.speed_bps > SPEED_EPSILON {
            Some((remaining_bytes as f64 / self.speed_bps).ceil() as u64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_recomputed_only_after_window() {
        let t0 = Instant::now();
        let mut window = SpeedWindow::new(t0);

        assert!(!window.sample(t0 + Duration::from_millis(100), 1024));
        assert_eq!(window.speed_bps(), 0);

        assert!(window.sample(t0 + Duration::from_secs(1), 2 * 1024 * 1024));
        assert_eq!(window.speed_bps(), 2 * 1024 * 1024);
    }

    #[test]
    fn eta_unknown_at_zero_speed_finite_otherwise() {
        let t0 = Instant::now();
        let mut window = SpeedWindow::new(t0);
        assert_eq!(window.eta_secs(1024), None);

        window.sample(t0 + Duration::from_secs(1), 1024 * 1024);
        assert_eq!(window.eta_secs(2 * 1024 * 1024), Some(2));
        assert_eq!(window.eta_secs(0), Some(0));
    }

    #[test]
    fn ratio_handles_zero_total() {
        let p = TransferProgress {
            id: "t".into(),
            remote_path: "/r/f".into(),
            local_path: "f".into(),
            state: TransferState::Running,
            total_bytes: 0,
            bytes_read: 0,
            speed_bps: 0,
            eta_secs: None,
        };
        assert_eq!(p.ratio(), 1.0);
    }
}
