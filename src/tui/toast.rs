use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A notification that disappears on its own after `ttl`
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
    ttl: Duration,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Toast {
            message: message.into(),
            kind,
            shown_at: now,
            ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }
}
