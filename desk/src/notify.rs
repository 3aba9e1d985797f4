//! Fire-and-forget user-facing notifications.

use crate::error::LifecycleError;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Tone of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Operation went through
    Success,
    /// Operation was refused
    Error,
}

/// Message for the person who triggered an operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Tone
    pub kind: NotificationKind,
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notification {
    /// Success notification
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notification
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notification describing a refused operation
    #[must_use]
    pub fn from_error(error: &LifecycleError) -> Self {
        Self::error(error.title(), error.user_message())
    }
}

/// Receives notifications; delivery must not fail the operation
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
            NotificationKind::Error => tracing::warn!(
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Copy of everything delivered so far
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Titles delivered so far, in order
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|notification| notification.title)
            .collect()
    }

    /// Drains the recorder
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(
            &mut *self
                .delivered
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_order_and_drains() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notification::success("Request Approved", "Inventory has been updated."));
        recorder.notify(Notification::error("Overdraft Warning", "Only 5 left."));

        assert_eq!(recorder.titles(), vec!["Request Approved", "Overdraft Warning"]);
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn error_notification_uses_error_title() {
        let notification = Notification::from_error(&LifecycleError::validation("Quantity must be positive"));
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.title, "Invalid Input");
        assert_eq!(notification.message, "Quantity must be positive");
    }
}
