//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpReservationApi**: reqwest による予約サービスのクライアント
//! - **FileTokenStore / FileScheduleStore**: JSON ファイルによる端末ローカル保存
//! - **InMemory***: テスト・開発用
//! - **TracingNotifier / RecordingNotifier**: 通知の出力先

pub mod file_store;
pub mod http_api;
pub mod memory;
pub mod notifier;

// 主要な型を再エクスポート
pub use self::file_store::{FileScheduleStore, FileTokenStore, JsonFile};
pub use self::http_api::HttpReservationApi;
pub use self::memory::{InMemoryReservationApi, InMemoryScheduleStore, InMemoryTokenStore};
pub use self::notifier::{RecordingNotifier, TracingNotifier};
