//! ReservationApi port - リモートの予約サービス
//!
//! 可用性・料金・競合解決・決済インテントの作成はすべてサーバ側の責務です。
//! クライアントはこの trait 越しに呼ぶだけです。
//!
//! # 実装
//! - **HttpReservationApi**: reqwest による本番実装
//! - **InMemoryReservationApi**: テスト・開発用

use async_trait::async_trait;

use crate::domain::{
    AuthToken, ClientError, Credentials, Profile, Registration, Reservation, ReservationId,
    ReservationRequest, Slot,
};

/// ReservationApi はサービスの REST API
///
/// # 設計原則
/// - 1 回の呼び出し = 1 回のリクエスト（リトライしない）
/// - 非成功ステータスは `ClientError::Service`（401/403 は `ClientError::Auth`）
/// - トークンは呼び出し側が渡す（この層は保存しない）
#[async_trait]
pub trait ReservationApi: Send + Sync {
    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ClientError>;

    /// `POST /register`
    async fn register(&self, registration: &Registration) -> Result<AuthToken, ClientError>;

    /// `GET /profile`
    async fn profile(&self, token: &AuthToken) -> Result<Profile, ClientError>;

    /// `GET /slots/{location}`
    async fn slots(&self, token: &AuthToken, location: &str) -> Result<Vec<Slot>, ClientError>;

    /// `POST /reserve`
    async fn create_reservation(
        &self,
        token: &AuthToken,
        request: &ReservationRequest,
    ) -> Result<ReservationId, ClientError>;

    /// `POST /save-reservation`
    async fn save_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
        total_charges: f64,
    ) -> Result<(), ClientError>;

    /// `GET /reservations/{id}`
    async fn reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<Reservation, ClientError>;

    /// `DELETE /reserve/{id}`
    async fn delete_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<(), ClientError>;

    /// `POST /create-payment-intent`: returns the payment sheet's client secret.
    async fn create_payment_intent(&self, amount_cents: u64) -> Result<String, ClientError>;
}
