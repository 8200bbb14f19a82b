//! ReservationDraft - 予約を送信する前のローカル検証と料金計算
//!
//! 料金の正本はサーバ側ですが、明らかに通らない予約は送信前に弾きます。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::ids::ReservationId;
use super::parking::Slot;

/// 最短の予約時間（秒）
pub const MIN_WINDOW_SECS: i64 = 60;

/// 決済できる最小料金（約 50 セント相当）
pub const MIN_TOTAL_CHARGES: f64 = 140.0;

/// 決済インテントに渡せる最小金額
pub const MIN_PAYMENT_AMOUNT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Bike,
    Truck,
}

impl VehicleType {
    /// Rate per slot per hour, in the service's currency.
    pub fn hourly_rate(self) -> f64 {
        match self {
            VehicleType::Car => 8400.0,
            VehicleType::Bike => 8400.0,
            VehicleType::Truck => 8400.0,
        }
    }
}

/// ReservationDraft はユーザーが入力中の予約
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDraft {
    pub vehicle_name: String,
    pub vehicle_type: VehicleType,
    pub parking_location: String,
    pub selected_slots: Vec<Slot>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ReservationDraft {
    /// hours * hourly rate * slot count
    pub fn total_charges(&self) -> f64 {
        let millis = (self.end_time - self.start_time).num_milliseconds() as f64;
        millis * self.vehicle_type.hourly_rate() * self.selected_slots.len() as f64 / 3_600_000.0
    }

    /// 検証して `POST /reserve` のボディを作る
    ///
    /// # 検証
    /// - end > start かつ 1 分以上
    /// - slot が 1 つ以上選ばれている
    /// - 料金が最小額以上
    pub fn into_request(self) -> Result<ReservationRequest, ValidationError> {
        let window = self.end_time - self.start_time;
        if window <= chrono::Duration::zero() {
            return Err(ValidationError::EndBeforeStart);
        }
        if window < chrono::Duration::seconds(MIN_WINDOW_SECS) {
            return Err(ValidationError::WindowTooShort);
        }
        if self.selected_slots.is_empty() {
            return Err(ValidationError::NoSlots);
        }
        if self.parking_location.trim().is_empty() {
            return Err(ValidationError::MissingField("parking location"));
        }

        let total_charges = self.total_charges();
        if total_charges < MIN_TOTAL_CHARGES {
            return Err(ValidationError::ChargeTooLow(total_charges));
        }

        Ok(ReservationRequest {
            date: self.start_time.date_naive(),
            vehicle_name: self.vehicle_name,
            vehicle_type: self.vehicle_type,
            parking_location: self.parking_location,
            selected_slots: self.selected_slots,
            start_time: self.start_time,
            end_time: self.end_time,
            total_charges,
        })
    }
}

/// `POST /reserve` のボディ（検証済み）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub vehicle_name: String,
    pub vehicle_type: VehicleType,
    pub parking_location: String,
    pub selected_slots: Vec<Slot>,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_charges: f64,
}

/// `POST /reserve` の 201 応答
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedBody {
    pub reservation: CreatedReservation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedReservation {
    #[serde(alias = "_id")]
    pub id: ReservationId,
}

/// 決済インテント用に最小通貨単位へ変換（四捨五入）
pub fn amount_in_cents(total_charges: f64) -> Result<u64, ValidationError> {
    if !total_charges.is_finite() || total_charges < MIN_PAYMENT_AMOUNT {
        return Err(ValidationError::ChargeTooLow(total_charges));
    }
    Ok((total_charges * 100.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn slot(id: &str) -> Slot {
        Slot {
            id: id.into(),
            unavailable: false,
        }
    }

    fn draft(window: Duration, slots: usize) -> ReservationDraft {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        ReservationDraft {
            vehicle_name: "KHI-123".into(),
            vehicle_type: VehicleType::Car,
            parking_location: "Nepa".into(),
            selected_slots: (0..slots).map(|i| slot(&i.to_string())).collect(),
            start_time: start,
            end_time: start + window,
        }
    }

    #[test]
    fn charges_scale_with_hours_and_slots() {
        assert_eq!(draft(Duration::hours(2), 1).total_charges(), 16800.0);
        assert_eq!(draft(Duration::minutes(30), 2).total_charges(), 8400.0);
    }

    #[rstest]
    #[case::inverted(draft(Duration::minutes(-5), 1), ValidationError::EndBeforeStart)]
    #[case::empty(draft(Duration::zero(), 1), ValidationError::EndBeforeStart)]
    #[case::too_short(draft(Duration::seconds(59), 1), ValidationError::WindowTooShort)]
    #[case::no_slots(draft(Duration::hours(1), 0), ValidationError::NoSlots)]
    fn invalid_drafts_are_rejected(#[case] draft: ReservationDraft, #[case] expected: ValidationError) {
        assert_eq!(draft.into_request().unwrap_err(), expected);
    }

    #[test]
    fn one_minute_for_one_slot_meets_the_minimum() {
        // 8400 / 60 = 140
        let request = draft(Duration::minutes(1), 1).into_request().unwrap();
        assert_eq!(request.total_charges, 140.0);
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn request_uses_service_field_names() {
        let request = draft(Duration::hours(1), 1).into_request().unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["vehicleType"], "car");
        assert_eq!(json["parkingLocation"], "Nepa");
        assert_eq!(json["totalCharges"], 8400.0);
        assert_eq!(json["selectedSlots"][0]["id"], "0");
    }

    #[rstest]
    #[case(140.0, 14000)]
    #[case(0.5, 50)]
    #[case(12.346, 1235)]
    fn amounts_are_rounded_to_cents(#[case] total: f64, #[case] cents: u64) {
        assert_eq!(amount_in_cents(total).unwrap(), cents);
    }

    #[test]
    fn tiny_amounts_cannot_be_paid() {
        assert!(matches!(amount_in_cents(0.49), Err(ValidationError::ChargeTooLow(_))));
        assert!(amount_in_cents(f64::NAN).is_err());
    }
}
