use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message about the last import.
///
/// Notifications are not part of the collection and are never persisted.
/// Each one stays visible for a fixed time after it is raised, or until it is
/// dismissed.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    raised_at: Instant,
    visible_for: Duration,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, visible_for: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Instant::now(),
            visible_for,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.visible_for
    }
}
