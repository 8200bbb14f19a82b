//! BookingService - 空き slot の取得・予約・ユーザーによるキャンセル・決済インテント

use std::sync::Arc;

use tracing::{info, warn};

use super::held::HeldReservation;
use super::scheduler::ActiveSchedules;
use crate::domain::{
    ClientError, Notification, ReservationDraft, ReservationId, Slot, amount_in_cents,
};
use crate::ports::{Notifier, ReservationApi, ScheduleStore, TokenStore};

pub struct BookingService {
    api: Arc<dyn ReservationApi>,
    tokens: Arc<dyn TokenStore>,
    schedules: Arc<dyn ScheduleStore>,
    held: HeldReservation,
    running: ActiveSchedules,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        tokens: Arc<dyn TokenStore>,
        schedules: Arc<dyn ScheduleStore>,
        held: HeldReservation,
        running: ActiveSchedules,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tokens,
            schedules,
            held,
            running,
            notifier,
        }
    }

    /// `GET /slots/{location}`
    pub async fn slots(&self, location: &str) -> Result<Vec<Slot>, ClientError> {
        let result = self.try_slots(location).await;
        self.surface(result)
    }

    /// ドラフトを検証して `POST /reserve`
    pub async fn book(&self, draft: ReservationDraft) -> Result<ReservationId, ClientError> {
        let result = self.try_book(draft).await;
        if let Ok(id) = &result {
            info!(reservation_id = %id, "reservation created");
            self.notifier
                .notify(Notification::success("Success", "Reservation made successfully"));
        }
        self.surface(result)
    }

    /// 決済後に `POST /save-reservation`
    pub async fn save(&self, id: &ReservationId, total_charges: f64) -> Result<(), ClientError> {
        let result = self.try_save(id, total_charges).await;
        self.surface(result)
    }

    /// ユーザーによるキャンセル（`DELETE /reserve/{id}`）
    ///
    /// カウントダウン中の予約なら、スケジュールを止めて
    /// ローカルのコピーと保存済みスケジュールも消す（期限切れで 2 回目の削除を送らない）。
    pub async fn cancel(&self, id: &ReservationId) -> Result<(), ClientError> {
        let result = self.try_cancel(id).await;
        if result.is_ok() {
            info!(reservation_id = %id, "reservation cancelled");
            self.notifier
                .notify(Notification::success("Success", "Reservation deleted successfully"));
        }
        self.surface(result)
    }

    /// `POST /create-payment-intent`。返り値は client secret
    pub async fn payment_intent(&self, total_charges: f64) -> Result<String, ClientError> {
        let result = self.try_payment_intent(total_charges).await;
        self.surface(result)
    }

    async fn try_slots(&self, location: &str) -> Result<Vec<Slot>, ClientError> {
        let token = self.tokens.require().await?;
        self.api.slots(&token, location).await
    }

    async fn try_book(&self, draft: ReservationDraft) -> Result<ReservationId, ClientError> {
        let request = draft.into_request()?;
        let token = self.tokens.require().await?;
        self.api.create_reservation(&token, &request).await
    }

    async fn try_save(&self, id: &ReservationId, total_charges: f64) -> Result<(), ClientError> {
        let token = self.tokens.require().await?;
        self.api.save_reservation(&token, id, total_charges).await
    }

    async fn try_cancel(&self, id: &ReservationId) -> Result<(), ClientError> {
        let token = self.tokens.require().await?;
        self.api.delete_reservation(&token, id).await?;
        self.running.cancel(id);
        if self.held.clear_if(id) {
            self.schedules.clear().await?;
        }
        Ok(())
    }

    async fn try_payment_intent(&self, total_charges: f64) -> Result<String, ClientError> {
        let amount = amount_in_cents(total_charges)?;
        self.api.create_payment_intent(amount).await
    }

    fn surface<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            warn!(kind = ?err.kind(), error = %err, "booking operation failed");
            self.notifier.notify(Notification::from_error(err));
        }
        result
    }
}
