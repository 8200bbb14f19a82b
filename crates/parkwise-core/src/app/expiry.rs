//! ExpiryHandler - 期限切れの予約をサーバから削除する
//!
//! # 流れ
//! 1. `Notification::TimeUp` でユーザーに知らせる（音 + バイブレーション）
//! 2. `DELETE /reserve/{id}` を 1 回だけ送る
//! 3. 成功: ローカルのコピーと保存済みスケジュールを消し、`Removed` を通知
//! 4. 失敗: エラーを通知するだけ（リトライしない・ローカルのコピーは残す）

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::held::HeldReservation;
use super::scheduler::ExpiryAction;
use crate::domain::{ClientError, Notification, Reservation, ReservationId};
use crate::ports::{Notifier, ReservationApi, ScheduleStore, TokenStore};

pub struct ExpiryHandler {
    api: Arc<dyn ReservationApi>,
    tokens: Arc<dyn TokenStore>,
    schedules: Arc<dyn ScheduleStore>,
    held: HeldReservation,
    notifier: Arc<dyn Notifier>,
}

impl ExpiryHandler {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        tokens: Arc<dyn TokenStore>,
        schedules: Arc<dyn ScheduleStore>,
        held: HeldReservation,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tokens,
            schedules,
            held,
            notifier,
        }
    }

    /// 期限切れ処理を 1 回行う
    pub async fn handle(&self, id: &ReservationId) -> Result<(), ClientError> {
        self.notifier.notify(Notification::TimeUp {
            reservation_id: id.clone(),
        });

        match self.delete(id).await {
            Ok(()) => {
                self.held.clear_if(id);
                if let Err(err) = self.forget_schedule(id).await {
                    warn!(reservation_id = %id, error = %err, "failed to clear schedule record");
                }
                info!(reservation_id = %id, "expired reservation removed");
                self.notifier.notify(Notification::Removed {
                    reservation_id: id.clone(),
                });
                Ok(())
            }
            Err(err) => {
                error!(reservation_id = %id, kind = ?err.kind(), error = %err, "failed to remove expired reservation");
                self.notifier.notify(Notification::from_error(&err));
                Err(err)
            }
        }
    }

    /// 保存済みレコードが別の予約のものなら残す
    async fn forget_schedule(&self, id: &ReservationId) -> Result<(), ClientError> {
        match self.schedules.load().await? {
            Some(record) if &record.reservation_id != id => Ok(()),
            _ => self.schedules.clear().await,
        }
    }

    async fn delete(&self, id: &ReservationId) -> Result<(), ClientError> {
        let token = self.tokens.require().await?;
        self.api.delete_reservation(&token, id).await
    }
}

#[async_trait]
impl ExpiryAction for ExpiryHandler {
    async fn expired(&self, reservation: Reservation) {
        // 結果は handle() の中で通知済み
        let _ = self.handle(&reservation.id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthToken, ErrorKind, ScheduleRecord};
    use crate::impls::{
        InMemoryReservationApi, InMemoryScheduleStore, InMemoryTokenStore, RecordingNotifier,
    };
    use chrono::{TimeZone, Utc};

    fn reservation(id: &str) -> Reservation {
        Reservation::new(
            id.into(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(),
        )
    }

    struct Fixture {
        api: Arc<InMemoryReservationApi>,
        schedules: Arc<InMemoryScheduleStore>,
        held: HeldReservation,
        notifier: Arc<RecordingNotifier>,
        handler: ExpiryHandler,
    }

    fn fixture(api: InMemoryReservationApi, tokens: InMemoryTokenStore) -> Fixture {
        let api = Arc::new(api);
        let schedules = Arc::new(InMemoryScheduleStore::with_record(ScheduleRecord::from(
            &reservation("r1"),
        )));
        let held = HeldReservation::new();
        held.replace(reservation("r1"));
        let notifier = Arc::new(RecordingNotifier::new());
        let handler = ExpiryHandler::new(
            api.clone(),
            Arc::new(tokens),
            schedules.clone(),
            held.clone(),
            notifier.clone(),
        );
        Fixture {
            api,
            schedules,
            held,
            notifier,
            handler,
        }
    }

    #[tokio::test]
    async fn successful_delete_clears_local_state() {
        let token = AuthToken::new("t");
        let f = fixture(
            InMemoryReservationApi::new()
                .with_token(token.clone())
                .with_reservation(reservation("r1")),
            InMemoryTokenStore::with_token(token),
        );

        f.handler.handle(&"r1".into()).await.unwrap();

        assert_eq!(f.api.delete_requests(), vec![ReservationId::from("r1")]);
        assert!(!f.api.contains(&"r1".into()));
        assert!(f.held.get().is_none());
        assert!(f.schedules.current().is_none());

        let seen = f.notifier.notifications();
        assert_eq!(
            seen,
            vec![
                Notification::TimeUp {
                    reservation_id: "r1".into()
                },
                Notification::Removed {
                    reservation_id: "r1".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_local_copy() {
        let token = AuthToken::new("t");
        let f = fixture(
            InMemoryReservationApi::new()
                .with_token(token.clone())
                .with_reservation(reservation("r1"))
                .fail_deletes_with(500, "Internal Server Error"),
            InMemoryTokenStore::with_token(token),
        );

        let err = f.handler.handle(&"r1".into()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);

        // exactly one attempt, no retry
        assert_eq!(f.api.delete_requests().len(), 1);
        assert_eq!(f.held.get().map(|r| r.id), Some("r1".into()));
        assert!(f.schedules.current().is_some());

        let seen = f.notifier.notifications();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_alert());
        assert_eq!(seen[1], Notification::error("Error", "Internal Server Error"));
    }

    #[tokio::test]
    async fn missing_token_sends_no_delete() {
        let f = fixture(
            InMemoryReservationApi::new().with_reservation(reservation("r1")),
            InMemoryTokenStore::new(),
        );

        let err = f.handler.handle(&"r1".into()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(f.api.delete_requests().is_empty());
        assert!(f.held.get().is_some());
    }

    #[tokio::test]
    async fn newer_held_reservation_is_not_cleared() {
        let token = AuthToken::new("t");
        let f = fixture(
            InMemoryReservationApi::new()
                .with_token(token.clone())
                .with_reservation(reservation("r1")),
            InMemoryTokenStore::with_token(token),
        );
        f.held.replace(reservation("r2"));
        f.schedules
            .save(&ScheduleRecord::from(&reservation("r2")))
            .await
            .unwrap();

        f.handler.handle(&"r1".into()).await.unwrap();
        assert_eq!(f.held.get().map(|r| r.id), Some("r2".into()));
        assert_eq!(f.schedules.current().map(|r| r.reservation_id), Some("r2".into()));
    }
}
