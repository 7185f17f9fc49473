//! Timed, thread-safe status notifications.
//!
//! Background workers publish here; the foreground loop takes a snapshot
//! for rendering and prunes expired entries once per tick. Pruning never
//! happens on the render path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info};

/// How long a notification stays visible.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(10);

/// Fade-out window at the end of the lifetime.
const FADE_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Error,
    Info,
    Success,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotifyKind,
    pub created_at: Instant,
    pub lifetime: Duration,
}

impl Notification {
    fn new(message: String, kind: NotifyKind, lifetime: Duration) -> Self {
        Self {
            message,
            kind,
            created_at: Instant::now(),
            lifetime,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.lifetime
    }

    /// 255 for most of the lifetime, linear fade over the last 2 seconds.
    pub fn alpha_at(&self, now: Instant) -> u8 {
        let elapsed = now.saturating_duration_since(self.created_at);
        if elapsed > self.lifetime {
            return 0;
        }
        let remaining = self.lifetime - elapsed;
        if remaining >= FADE_WINDOW {
            255
        } else {
            (255.0 * remaining.as_secs_f64() / FADE_WINDOW.as_secs_f64()) as u8
        }
    }
}

/// Renderable view of one notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub message: String,
    pub kind: NotifyKind,
    pub alpha: u8,
}

/// Shared publish/snapshot/prune queue.
#[derive(Clone, Default)]
pub struct NotificationBus {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(message.into(), NotifyKind::Error, DEFAULT_LIFETIME);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(message.into(), NotifyKind::Info, DEFAULT_LIFETIME);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(message.into(), NotifyKind::Success, DEFAULT_LIFETIME);
    }

    pub fn push(&self, message: String, kind: NotifyKind, lifetime: Duration) {
        // Mirror to the diagnostic log so notifications survive the fade.
        match kind {
            NotifyKind::Error => error!("{}", message),
            NotifyKind::Info | NotifyKind::Success => info!("{}", message),
        }
        self.inner
            .lock()
            .push(Notification::new(message, kind, lifetime));
    }

    /// Consistent snapshot of unexpired entries for rendering.
    pub fn snapshot(&self) -> Vec<NotificationView> {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> Vec<NotificationView> {
        self.inner
            .lock()
            .iter()
            .filter(|n| !n.is_expired_at(now))
            .map(|n| NotificationView {
                message: n.message.clone(),
                kind: n.kind,
                alpha: n.alpha_at(now),
            })
            .collect()
    }

    /// Drop expired entries. Called from the foreground tick.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&self, now: Instant) {
        self.inner.lock().retain(|n| !n.is_expired_at(now));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with(lifetime: Duration) -> NotificationBus {
        let bus = NotificationBus::new();
        bus.push("hello".into(), NotifyKind::Info, lifetime);
        bus
    }

    #[test]
    fn snapshot_contains_entry_within_lifetime() {
        let bus = bus_with(Duration::from_secs(10));
        let created = bus.inner.lock()[0].created_at;

        let visible = bus.snapshot_at(created + Duration::from_secs(5));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "hello");
        assert_eq!(visible[0].alpha, 255);

        let gone = bus.snapshot_at(created + Duration::from_secs(11));
        assert!(gone.is_empty());
    }

    #[test]
    fn alpha_fades_in_final_window() {
        let n = Notification::new("x".into(), NotifyKind::Info, Duration::from_secs(10));
        let t0 = n.created_at;
        assert_eq!(n.alpha_at(t0), 255);
        assert_eq!(n.alpha_at(t0 + Duration::from_secs(7)), 255);
        let mid_fade = n.alpha_at(t0 + Duration::from_secs(9));
        assert!(mid_fade > 0 && mid_fade < 255);
        assert_eq!(n.alpha_at(t0 + Duration::from_secs(11)), 0);
    }

    #[test]
    fn prune_removes_only_expired() {
        let bus = NotificationBus::new();
        bus.push("old".into(), NotifyKind::Error, Duration::from_secs(1));
        bus.push("new".into(), NotifyKind::Success, Duration::from_secs(60));
        let created = bus.inner.lock()[0].created_at;

        bus.prune_at(created + Duration::from_secs(2));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.snapshot_at(created + Duration::from_secs(2))[0].message, "new");
    }
}
