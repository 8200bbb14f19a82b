//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（予約サービス、端末のストレージ、通知、時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod notifier;
pub mod reservation_api;
pub mod schedule_store;
pub mod token_store;

// 主要な trait を再エクスポート
pub use self::clock::{AnchoredClock, Clock, FixedClock, SystemClock};
pub use self::notifier::Notifier;
pub use self::reservation_api::ReservationApi;
pub use self::schedule_store::ScheduleStore;
pub use self::token_store::TokenStore;
