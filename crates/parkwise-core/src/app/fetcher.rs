//! ReservationFetcher - 予約を 1 回だけ取得する
//!
//! 失敗したらユーザーに 1 回通知してエラーを返します。リトライはしません。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ClientError, Notification, Reservation, ReservationId};
use crate::ports::{Notifier, ReservationApi, TokenStore};

pub struct ReservationFetcher {
    api: Arc<dyn ReservationApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReservationFetcher {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tokens,
            notifier,
        }
    }

    /// `GET /reservations/{id}`
    ///
    /// # エラー
    /// - トークンが無い: `ClientError::Auth`（リクエストは送らない）
    /// - 存在しない: `ClientError::Service { status: 404, .. }`
    /// - `end_time <= start_time` の予約: `ClientError::Parse`
    pub async fn fetch(&self, id: &ReservationId) -> Result<Reservation, ClientError> {
        match self.try_fetch(id).await {
            Ok(reservation) => {
                debug!(
                    reservation_id = %id,
                    start = %reservation.start_time,
                    end = %reservation.end_time,
                    "reservation fetched"
                );
                Ok(reservation)
            }
            Err(err) => {
                warn!(reservation_id = %id, kind = ?err.kind(), error = %err, "fetch failed");
                self.notifier.notify(Notification::from_error(&err));
                Err(err)
            }
        }
    }

    async fn try_fetch(&self, id: &ReservationId) -> Result<Reservation, ClientError> {
        let token = self.tokens.require().await?;
        let reservation = self.api.reservation(&token, id).await?;
        reservation
            .validate()
            .map_err(|e| ClientError::Parse(format!("reservation {id}: {e}")))?;
        Ok(reservation)
    }
}
