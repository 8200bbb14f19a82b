//! Notifier port - ユーザーへの通知（アラート・音・バイブレーション）

use crate::domain::Notification;

/// Notifier は通知を 1 回届ける
///
/// 配送の失敗は呼び出し側に返しません。通知は best effort です。
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
