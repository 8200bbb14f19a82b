//! CountdownSession - Fetcher → Scheduler → ExpiryHandler をつなぐ
//!
//! 画面で言えば「予約のカウントダウン画面」に相当します。
//! 同時に追跡する予約は 1 件だけです。

use std::sync::Arc;

use tracing::{info, warn};

use super::expiry::ExpiryHandler;
use super::fetcher::ReservationFetcher;
use super::held::HeldReservation;
use super::scheduler::{ExpiryScheduler, ScheduleHandle};
use crate::domain::{
    ClientError, ErrorKind, Notification, Reservation, ReservationId, ScheduleRecord,
};
use crate::ports::{Notifier, ScheduleStore};

pub struct CountdownSession {
    fetcher: ReservationFetcher,
    scheduler: ExpiryScheduler,
    handler: Arc<ExpiryHandler>,
    schedules: Arc<dyn ScheduleStore>,
    held: HeldReservation,
    notifier: Arc<dyn Notifier>,
}

impl CountdownSession {
    pub fn new(
        fetcher: ReservationFetcher,
        scheduler: ExpiryScheduler,
        handler: Arc<ExpiryHandler>,
        schedules: Arc<dyn ScheduleStore>,
        held: HeldReservation,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher,
            scheduler,
            handler,
            schedules,
            held,
            notifier,
        }
    }

    /// 予約を取得してカウントダウンを始める
    ///
    /// 取得に失敗したら（通知済みのエラーを返し）何も始めない。
    pub async fn open(&self, id: &ReservationId) -> Result<ScheduleHandle, ClientError> {
        let reservation = self.fetcher.fetch(id).await?;
        if let Err(err) = self.schedules.save(&ScheduleRecord::from(&reservation)).await {
            // 再開できなくなるだけなので、カウントダウン自体は続ける
            warn!(reservation_id = %id, error = %err, "failed to persist schedule record");
        }
        Ok(self.track(reservation))
    }

    /// 保存済みのレコードからカウントダウンを再開する
    ///
    /// 残り時間は現在時刻から計算し直す。保存が無ければ `None`。
    pub async fn resume(&self) -> Result<Option<ScheduleHandle>, ClientError> {
        let record = match self.schedules.load().await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(err) if err.kind() == ErrorKind::Parse => return Err(self.discard(err).await),
            Err(err) => {
                warn!(error = %err, "failed to load schedule record");
                self.notifier.notify(Notification::from_error(&err));
                return Err(err);
            }
        };

        let reservation = record.to_reservation();
        if let Err(err) = reservation.validate() {
            let err = ClientError::Parse(format!("stored schedule {}: {err}", record.reservation_id));
            return Err(self.discard(err).await);
        }

        info!(reservation_id = %reservation.id, "resuming countdown");
        Ok(Some(self.track(reservation)))
    }

    /// ローカルに保持している予約
    pub fn current(&self) -> Option<Reservation> {
        self.held.get()
    }

    /// 壊れたレコードは次の再開でも読めないので消しておく
    async fn discard(&self, err: ClientError) -> ClientError {
        warn!(error = %err, "discarding invalid schedule record");
        if let Err(clear_err) = self.schedules.clear().await {
            warn!(error = %clear_err, "failed to clear schedule record");
        }
        self.notifier.notify(Notification::from_error(&err));
        err
    }

    fn track(&self, reservation: Reservation) -> ScheduleHandle {
        self.held.replace(reservation.clone());
        self.scheduler.start(reservation, self.handler.clone())
    }
}
