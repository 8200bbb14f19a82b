//! HeldReservation - クライアントが保持する予約のローカルコピー
//!
//! 同時に保持するのは 1 件だけです。期限切れの削除が成功したときに、
//! 同じ id のものだけを消します（新しい予約を上書きで消さないため）。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{Reservation, ReservationId};

#[derive(Debug, Clone, Default)]
pub struct HeldReservation {
    inner: Arc<Mutex<Option<Reservation>>>,
}

impl HeldReservation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Reservation>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Option<Reservation> {
        self.lock().clone()
    }

    /// 新しい予約に差し替え、前のものを返す
    pub fn replace(&self, reservation: Reservation) -> Option<Reservation> {
        self.lock().replace(reservation)
    }

    /// 保持中の予約が `id` のときだけ消す。消したら true
    pub fn clear_if(&self, id: &ReservationId) -> bool {
        let mut held = self.lock();
        if held.as_ref().is_some_and(|r| &r.id == id) {
            *held = None;
            true
        } else {
            false
        }
    }
}
