//! Errors - エラー型と分類
//!
//! どのエラーも自動リトライせず、ユーザーへの通知を 1 回出して終わります。
//! アプリ全体を止めるエラーはありません。

use thiserror::Error;

/// ErrorKind はクライアントエラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// リクエストを送れなかった / 応答を受け取れなかった
    Network,
    /// 応答ボディが期待した形ではない
    Parse,
    /// サービスが非成功ステータスを返した
    Service,
    /// トークンが無い・無効（前提条件の失敗）
    Auth,
    /// 送信前のローカル検証に失敗
    Validation,
    /// ローカルストレージの読み書きに失敗
    Storage,
}

/// ValidationError は予約ドラフトの検証エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("end time must be after start time")]
    EndBeforeStart,

    #[error("end time must be at least 1 minute after start time")]
    WindowTooShort,

    #[error("please select at least one slot")]
    NoSlots,

    #[error("total amount must be at least 50 cents (got {0})")]
    ChargeTooLow(f64),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

/// ClientError はリモートサービスとローカル状態に対する操作のエラー
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("authentication required: {0}")]
    Auth(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Parse(_) => ErrorKind::Parse,
            ClientError::Service { .. } => ErrorKind::Service,
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The "does not exist" case of a lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Service { status: 404, .. })
    }

    /// ユーザーに見せる文言
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            ClientError::Parse(_) => "Failed to read the server response. Please try again.".to_string(),
            ClientError::Service { message, .. } => message.clone(),
            ClientError::Auth(_) => "Please log in again.".to_string(),
            ClientError::Validation(err) => err.to_string(),
            ClientError::Storage(_) => "Could not access local storage.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::network(ClientError::Network("reset".into()), ErrorKind::Network)]
    #[case::parse(ClientError::Parse("eof".into()), ErrorKind::Parse)]
    #[case::service(ClientError::Service { status: 500, message: "boom".into() }, ErrorKind::Service)]
    #[case::auth(ClientError::Auth("no token".into()), ErrorKind::Auth)]
    #[case::validation(ClientError::from(ValidationError::NoSlots), ErrorKind::Validation)]
    #[case::storage(ClientError::Storage("denied".into()), ErrorKind::Storage)]
    fn errors_are_classified(#[case] err: ClientError, #[case] kind: ErrorKind) {
        assert_eq!(err.kind(), kind);
    }

    #[test]
    fn not_found_is_a_service_error() {
        let err = ClientError::Service {
            status: 404,
            message: "Reservation not found".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Reservation not found");
        assert!(!ClientError::Network("x".into()).is_not_found());
    }
}
