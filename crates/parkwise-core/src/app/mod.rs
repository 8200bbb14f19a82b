//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **ReservationFetcher**: 予約の取得（1 回だけ、リトライなし）
//! - **ExpiryScheduler**: 開始待ち → カウントダウン → 期限切れ
//! - **ExpiryHandler**: 期限切れの予約の削除と通知
//! - **CountdownSession**: 上の 3 つをつなぐ
//! - **AccountService / BookingService**: ログインや予約などその他の操作

pub mod account;
pub mod booking;
pub mod builder;
pub mod expiry;
pub mod fetcher;
pub mod held;
pub mod scheduler;
pub mod session;

// 主要な型を再エクスポート
pub use self::account::AccountService;
pub use self::booking::BookingService;
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::expiry::ExpiryHandler;
pub use self::fetcher::ReservationFetcher;
pub use self::held::HeldReservation;
pub use self::scheduler::{
    ActiveSchedules, ExpiryAction, ExpiryScheduler, ScheduleHandle, ScheduleState,
};
pub use self::session::CountdownSession;
