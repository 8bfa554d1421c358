//! Transient status message owned by a controller.
//!
//! Expiry is a timestamp checked on read rather than a background timer, so
//! dropping the owner drops the notification with it.

use std::time::Duration;

use tokio::time::Instant;

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one notification; posting replaces the current one and
/// restarts its expiry.
#[derive(Debug, Clone)]
pub struct NotificationSlot {
    ttl: Duration,
    current: Option<Notification>,
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationSlot {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn post(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> &Notification {
        self.current.insert(Notification {
            message: message.into(),
            kind,
            expires_at: now + self.ttl,
        })
    }

    pub fn current(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    /// Drops the held notification once it has expired. Returns whether
    /// anything was cleared.
    pub fn clear_expired(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_is_visible_until_ttl_elapses() {
        let start = Instant::now();
        let mut slot = NotificationSlot::default();
        slot.post(NotificationKind::Success, "Added Ada", start);

        let shown = slot
            .current(start + Duration::from_millis(4_999))
            .expect("still visible");
        assert_eq!(shown.message, "Added Ada");
        assert!(slot.current(start + NOTIFICATION_TTL).is_none());
    }

    #[test]
    fn posting_again_supersedes_and_restarts_expiry() {
        let start = Instant::now();
        let mut slot = NotificationSlot::new(Duration::from_secs(5));
        slot.post(NotificationKind::Success, "Added Ada", start);

        let later = start + Duration::from_secs(3);
        slot.post(NotificationKind::Error, "Al is too short", later);

        let shown = slot
            .current(start + Duration::from_secs(6))
            .expect("restarted timer keeps it alive");
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, "Al is too short");
        assert!(slot.current(later + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn clear_expired_only_drops_stale_notifications() {
        let start = Instant::now();
        let mut slot = NotificationSlot::default();
        slot.post(NotificationKind::Success, "Deleted Dan Abramov", start);

        assert!(!slot.clear_expired(start + Duration::from_secs(1)));
        assert!(slot.clear_expired(start + Duration::from_secs(5)));
        assert!(slot.current(start).is_none());
    }
}
