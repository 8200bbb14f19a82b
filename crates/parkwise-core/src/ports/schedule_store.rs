//! ScheduleStore port - カウントダウンの永続化
//!
//! プロセスが中断されてもカウントダウンを再開できるように、
//! スケジュール開始時に `{reservation_id, start_time, end_time}` を保存します。
//! 同時に追跡する予約は 1 件だけです。

use async_trait::async_trait;

use crate::domain::{ClientError, ScheduleRecord};

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn load(&self) -> Result<Option<ScheduleRecord>, ClientError>;

    async fn save(&self, record: &ScheduleRecord) -> Result<(), ClientError>;

    async fn clear(&self) -> Result<(), ClientError>;
}
