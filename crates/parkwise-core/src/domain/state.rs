//! State - スケジュールの状態
//!
//! # 状態遷移
//! - Idle -> WaitingForStart: 開始時刻がまだ先
//! - Idle -> Counting: 開始済み（待ち時間 0）
//! - WaitingForStart -> Counting: 開始までの待ちが終わった
//! - Counting -> Expired: remaining <= 0
//! - Idle / WaitingForStart / Counting -> Cancelled: ハンドルの cancel / drop
//!
//! Expired と Cancelled からは遷移しません。

/// SchedulePhase はカウントダウン 1 本の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulePhase {
    /// まだ何も始まっていない
    Idle,
    /// 予約の開始時刻を待っている
    WaitingForStart,
    /// 1 秒ごとに残り時間を更新中
    Counting,
    /// 終了時刻に達した（期限切れ処理へ）
    Expired,
    /// 画面が閉じられた等でキャンセルされた
    Cancelled,
}

impl SchedulePhase {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, SchedulePhase::Expired | SchedulePhase::Cancelled)
    }

    pub fn can_transition_to(self, next: SchedulePhase) -> bool {
        use SchedulePhase::*;
        matches!(
            (self, next),
            (Idle, WaitingForStart)
                | (Idle, Counting)
                | (WaitingForStart, Counting)
                | (Counting, Expired)
                | (Idle | WaitingForStart | Counting, Cancelled)
        )
    }
}

/// ScheduleOutcome はスケジュールの終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// 終了時刻に達し、期限切れ処理が 1 回実行された
    Expired,
    /// 期限切れ前にキャンセルされた（削除リクエストは出ていない）
    Cancelled,
}

impl From<ScheduleOutcome> for SchedulePhase {
    fn from(outcome: ScheduleOutcome) -> Self {
        match outcome {
            ScheduleOutcome::Expired => SchedulePhase::Expired,
            ScheduleOutcome::Cancelled => SchedulePhase::Cancelled,
        }
    }
}
