//! Notifier implementations

use std::sync::{Mutex, PoisonError};

use tracing::{error, info, warn};

use crate::domain::Notification;
use crate::ports::Notifier;

/// TracingNotifier は通知をログとして出す（CLI 用）
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let title = notification.title();
        let message = notification.message();
        if notification.is_error() {
            error!(target: "parkwise::notify", %title, %message, "notification");
        } else if notification.is_alert() {
            warn!(target: "parkwise::notify", %title, %message, alert = true, "notification");
        } else {
            info!(target: "parkwise::notify", %title, %message, "notification");
        }
    }
}

/// RecordingNotifier は届いた通知を順番に記録する（テスト用）
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 記録を取り出して空にする
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
