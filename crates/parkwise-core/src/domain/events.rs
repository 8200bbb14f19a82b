//! Events - ユーザーに届ける通知
//!
//! 画面のアラートやバイブレーションに相当します。
//! 配送は `Notifier` port に任せ、ここでは内容だけを定義します。

use super::errors::ClientError;
use super::ids::ReservationId;

/// Notification はユーザーに 1 回だけ見せる通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// 予約時間が終わった（音 + バイブレーション付きのアラート）
    TimeUp { reservation_id: ReservationId },

    /// 期限切れの予約をサーバから削除した
    Removed { reservation_id: ReservationId },

    /// 操作が成功した
    Success { title: String, message: String },

    /// 操作が失敗した
    Error { title: String, message: String },
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification::Success {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &ClientError) -> Self {
        Notification::error("Error", err.user_message())
    }

    pub fn title(&self) -> &str {
        match self {
            Notification::TimeUp { .. } => "Time Up",
            Notification::Removed { .. } => "Success",
            Notification::Success { title, .. } | Notification::Error { title, .. } => title,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::TimeUp { .. } => "Your reservation time has ended.",
            Notification::Removed { .. } => "Reservation time expired and has been removed.",
            Notification::Success { message, .. } | Notification::Error { message, .. } => message,
        }
    }

    /// Audible tone and vibration accompany this notification.
    pub fn is_alert(&self) -> bool {
        matches!(self, Notification::TimeUp { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error { .. })
    }
}
