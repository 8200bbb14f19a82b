//! Domain model (IDs, reservations, countdown, schedule state, notifications, ...).
//!
//! ここには I/O を持たない型だけを置きます。
//! ネットワーク・ストレージ・時刻は `ports` 越しに扱います。

pub mod account;
pub mod countdown;
pub mod draft;
pub mod errors;
pub mod events;
pub mod ids;
pub mod parking;
pub mod reservation;
pub mod state;

pub use self::account::{AuthToken, Credentials, Registration};
pub use self::countdown::Countdown;
pub use self::draft::{ReservationDraft, ReservationRequest, VehicleType, amount_in_cents};
pub use self::errors::{ClientError, ErrorKind, ValidationError};
pub use self::events::Notification;
pub use self::ids::{ReservationId, SlotId};
pub use self::parking::{ParkingPlace, Profile, Slot};
pub use self::reservation::{Reservation, ReservationWindow, ScheduleRecord};
pub use self::state::{ScheduleOutcome, SchedulePhase};
