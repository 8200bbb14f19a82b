//! Reservation - サーバが持つ予約レコードのクライアント側コピー
//!
//! 予約の正本はサーバにあります。クライアントはカウントダウンの間だけ
//! 読み取り専用のコピーを保持し、終了時刻を過ぎたら明示的に削除します。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use super::errors::ValidationError;
use super::ids::ReservationId;

/// A booked parking slot with a defined time window.
///
/// Slot and charge details are opaque to the countdown flow and are kept only
/// so the record can be shown back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(alias = "_id")]
    pub id: ReservationId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_location: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_slots: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_charges: Option<f64>,
}

impl Reservation {
    pub fn new(id: ReservationId, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id,
            start_time,
            end_time,
            parking_location: None,
            selected_slots: Vec::new(),
            total_charges: None,
        }
    }

    /// `end_time > start_time` を確認
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_time <= self.start_time {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(())
    }

    pub fn window(&self) -> ReservationWindow {
        ReservationWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// ReservationWindow は予約の [start, end) 区間
///
/// 残り時間は常に絶対時刻と現在時刻の差から計算します。
/// tick の回数から経過時間を積み上げることはしません（ドリフト防止）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReservationWindow {
    /// 開始までの待ち時間。開始済みなら 0
    pub fn time_to_start(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.start - now).to_std().unwrap_or(std::time::Duration::ZERO)
    }

    /// 終了までの残り時間（負になり得る）
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.end - now
    }

    /// 残り時間が 0 以下なら終了
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) <= chrono::Duration::zero()
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        Countdown::from_remaining(self.remaining(now))
    }
}

/// ScheduleRecord はプロセス中断後にカウントダウンを再開するための永続レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub reservation_id: ReservationId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduleRecord {
    /// Rebuilds the minimal reservation the scheduler needs.
    pub fn to_reservation(&self) -> Reservation {
        Reservation::new(self.reservation_id.clone(), self.start_time, self.end_time)
    }
}

impl From<&Reservation> for ScheduleRecord {
    fn from(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id.clone(),
            start_time: reservation.start_time,
            end_time: reservation.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn deserializes_service_payload() {
        let body = r#"{
            "_id": "665f1c",
            "startTime": "2024-05-01T10:00:00.000Z",
            "endTime": "2024-05-01T11:30:00.000Z",
            "parkingLocation": "Nepa",
            "selectedSlots": [{"id": 3}],
            "totalCharges": 12600,
            "vehicleType": "car"
        }"#;

        let r: Reservation = serde_json::from_str(body).unwrap();
        assert_eq!(r.id.as_str(), "665f1c");
        assert_eq!(r.start_time, at(10, 0, 0));
        assert_eq!(r.end_time, at(11, 30, 0));
        assert_eq!(r.parking_location.as_deref(), Some("Nepa"));
        assert_eq!(r.selected_slots.len(), 1);
        assert_eq!(r.total_charges, Some(12600.0));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn plain_id_field_is_accepted() {
        let body = r#"{"id":"r1","startTime":"2024-05-01T10:00:00Z","endTime":"2024-05-01T10:01:00Z"}"#;
        let r: Reservation = serde_json::from_str(body).unwrap();
        assert_eq!(r.id.as_str(), "r1");
    }

    #[test]
    fn inverted_window_is_rejected() {
        let r = Reservation::new("r".into(), at(10, 0, 0), at(10, 0, 0));
        assert_eq!(r.validate(), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn time_to_start_is_clamped_to_zero() {
        let w = Reservation::new("r".into(), at(10, 0, 0), at(11, 0, 0)).window();

        assert_eq!(w.time_to_start(at(9, 59, 30)), std::time::Duration::from_secs(30));
        assert_eq!(w.time_to_start(at(10, 0, 0)), std::time::Duration::ZERO);
        assert_eq!(w.time_to_start(at(10, 20, 0)), std::time::Duration::ZERO);
    }

    #[test]
    fn remaining_is_measured_against_end() {
        let w = Reservation::new("r".into(), at(10, 0, 0), at(11, 0, 0)).window();

        assert_eq!(w.remaining(at(10, 59, 0)), Duration::seconds(60));
        assert!(!w.has_ended(at(10, 59, 59)));
        assert!(w.has_ended(at(11, 0, 0)));
        assert!(w.has_ended(at(12, 0, 0)));
    }

    #[test]
    fn schedule_record_keeps_the_window() {
        let r = Reservation::new("r9".into(), at(10, 0, 0), at(11, 0, 0));
        let record = ScheduleRecord::from(&r);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["reservationId"], "r9");

        let rebuilt = record.to_reservation();
        assert_eq!(rebuilt.window(), r.window());
    }
}
