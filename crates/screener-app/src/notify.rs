// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::NotificationToken;
use std::time::Duration;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub token: NotificationToken,
    pub kind: NotificationKind,
    pub message: String,
}

/// Holds at most one transient message. Each `notify` supersedes the previous
/// one; `expire` only clears the message it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifier {
    current: Option<Notification>,
    last_token: NotificationToken,
    duration: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            last_token: NotificationToken::default(),
            duration,
        }
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    pub const fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> Notification {
        self.last_token = self.last_token.next();
        let notification = Notification {
            token: self.last_token,
            kind,
            message: message.into(),
        };
        self.current = Some(notification.clone());
        notification
    }

    pub fn expire(&mut self, token: NotificationToken) -> bool {
        match &self.current {
            Some(current) if current.token == token => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationKind, Notifier};

    #[test]
    fn expire_ignores_superseded_tokens() {
        let mut notifier = Notifier::default();
        let first = notifier.notify("first", NotificationKind::Info);
        let second = notifier.notify("second", NotificationKind::Error);

        assert!(!notifier.expire(first.token));
        assert_eq!(
            notifier.current().map(|note| note.message.as_str()),
            Some("second")
        );

        assert!(notifier.expire(second.token));
        assert!(notifier.current().is_none());
        assert!(!notifier.expire(second.token));
    }

    #[test]
    fn tokens_increase() {
        let mut notifier = Notifier::default();
        let first = notifier.notify("a", NotificationKind::Info);
        let second = notifier.notify("b", NotificationKind::Info);
        assert!(second.token > first.token);
    }
}
