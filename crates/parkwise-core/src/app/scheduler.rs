//! ExpiryScheduler - 予約の開始を待ち、終了までカウントダウンする
//!
//! # 流れ
//! 1. `time_to_start = start_time - now` だけ待つ（過去なら待たない）
//! 2. `tick` ごとに `remaining = end_time - now` を計算して公開
//! 3. `remaining <= 0` でループを抜け、`ExpiryAction` を 1 回だけ呼ぶ
//!
//! # 学習ポイント
//! - 残り時間は毎回 Clock から計算する（tick の回数を数えない）
//! - 停止は `watch::Sender<bool>` で伝え、すべての待機点で `select!` と競合させる
//! - ScheduleHandle を drop するとスケジュールも止まる
//! - 実行中のスケジュールは `ActiveSchedules` に弱参照で登録し、id で外から止められる

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::domain::{Countdown, Reservation, ReservationId, ScheduleOutcome, SchedulePhase};
use crate::ports::Clock;

/// 0 を渡された場合の下限
const MIN_TICK: Duration = Duration::from_millis(1);

/// ExpiryAction は `Expired` に入ったときに 1 回だけ呼ばれる
///
/// 呼び出し中にハンドルが cancel / drop されても中断しません。
#[async_trait]
pub trait ExpiryAction: Send + Sync {
    async fn expired(&self, reservation: Reservation);
}

/// 表示用のスナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub phase: SchedulePhase,
    pub countdown: Countdown,
}

/// ActiveSchedules は実行中スケジュールの停止スイッチを id ごとに持つ
///
/// ハンドルを持っていない側（ユーザーによるキャンセルなど）から止めるために使います。
/// 保持するのは弱参照なので、ハンドルの drop による停止はそのまま働きます。
#[derive(Debug, Clone, Default)]
pub struct ActiveSchedules {
    inner: Arc<Mutex<Vec<(ReservationId, Weak<watch::Sender<bool>>)>>>,
}

impl ActiveSchedules {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ReservationId, Weak<watch::Sender<bool>>)>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, id: ReservationId, shutdown_tx: &Arc<watch::Sender<bool>>) {
        let mut active = self.lock();
        active.retain(|(_, tx)| running(tx).is_some());
        active.push((id, Arc::downgrade(shutdown_tx)));
    }

    /// `id` のスケジュールをすべて止める。止めた数を返す
    ///
    /// 終了したタスクやハンドルが drop 済みのものは数えない。
    pub fn cancel(&self, id: &ReservationId) -> usize {
        let mut active = self.lock();
        active.retain(|(_, tx)| running(tx).is_some());
        let mut cancelled = 0;
        for (_, tx) in active.iter().filter(|(scheduled, _)| scheduled == id) {
            if let Some(tx) = running(tx) {
                let _ = tx.send(true);
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            info!(reservation_id = %id, cancelled, "schedule cancelled by id");
        }
        cancelled
    }
}

/// タスクが shutdown を受け取れる状態なら Sender を返す
fn running(tx: &Weak<watch::Sender<bool>>) -> Option<Arc<watch::Sender<bool>>> {
    tx.upgrade().filter(|tx| !tx.is_closed())
}

pub struct ExpiryScheduler {
    clock: Arc<dyn Clock>,
    tick: Duration,
    active: ActiveSchedules,
}

impl ExpiryScheduler {
    pub fn new(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self {
            clock,
            tick: tick.max(MIN_TICK),
            active: ActiveSchedules::new(),
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// このスケジューラが起動したスケジュールの登録簿（clone は同じものを共有する）
    pub fn active(&self) -> ActiveSchedules {
        self.active.clone()
    }

    /// スケジュールを開始する
    ///
    /// tokio runtime の中で呼ぶこと。
    pub fn start(&self, reservation: Reservation, action: Arc<dyn ExpiryAction>) -> ScheduleHandle {
        let window = reservation.window();
        let (state_tx, state_rx) = watch::channel(ScheduleState {
            phase: SchedulePhase::Idle,
            countdown: window.countdown(self.clock.now()),
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shutdown_tx = Arc::new(shutdown_tx);

        info!(
            reservation_id = %reservation.id,
            start = %reservation.start_time,
            end = %reservation.end_time,
            "schedule started"
        );

        let reservation_id = reservation.id.clone();
        self.active.register(reservation_id.clone(), &shutdown_tx);
        let run = ScheduleRun {
            reservation,
            clock: Arc::clone(&self.clock),
            tick: self.tick,
            action,
            state_tx,
        };
        let join = tokio::spawn(run.run(shutdown_rx));

        ScheduleHandle {
            reservation_id,
            shutdown_tx,
            state_rx,
            join: Some(join),
        }
    }
}

/// 1 件のスケジュールを実行するタスクの中身
struct ScheduleRun {
    reservation: Reservation,
    clock: Arc<dyn Clock>,
    tick: Duration,
    action: Arc<dyn ExpiryAction>,
    state_tx: watch::Sender<ScheduleState>,
}

impl ScheduleRun {
    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> ScheduleOutcome {
        let window = self.reservation.window();

        let wait = window.time_to_start(self.clock.now());
        if !wait.is_zero() {
            self.publish(SchedulePhase::WaitingForStart, window.countdown(self.clock.now()));
            debug!(reservation_id = %self.reservation.id, wait_secs = wait.as_secs(), "waiting for start");
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown_rx) => return self.cancel(),
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.publish(SchedulePhase::Counting, window.countdown(self.clock.now()));

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown_rx) => return self.cancel(),
                _ = ticker.tick() => {}
            }

            let now = self.clock.now();
            if window.has_ended(now) {
                self.publish(SchedulePhase::Expired, Countdown::zero());
                info!(reservation_id = %self.reservation.id, "reservation time is up");
                self.action.expired(self.reservation.clone()).await;
                return ScheduleOutcome::Expired;
            }
            self.publish(SchedulePhase::Counting, window.countdown(now));
        }
    }

    fn cancel(&self) -> ScheduleOutcome {
        let countdown = self.state_tx.borrow().countdown;
        self.publish(SchedulePhase::Cancelled, countdown);
        info!(reservation_id = %self.reservation.id, "schedule cancelled");
        ScheduleOutcome::Cancelled
    }

    /// 値が変わったときだけ購読者を起こす
    fn publish(&self, phase: SchedulePhase, countdown: Countdown) {
        let next = ScheduleState { phase, countdown };
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            if state.phase != phase {
                debug_assert!(state.phase.can_transition_to(phase));
                debug!(
                    reservation_id = %self.reservation.id,
                    from = ?state.phase,
                    to = ?phase,
                    "phase changed"
                );
            }
            *state = next;
            true
        });
    }
}

/// shutdown が要求されるか、ハンドルが drop されたら完了する
async fn cancelled(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

/// ScheduleHandle は 1 件のスケジュールの所有者
///
/// - `cancel()` または drop で止まる（`Expired` 後の削除処理は止めない）
/// - `subscribe()` で表示用の状態を購読できる
pub struct ScheduleHandle {
    reservation_id: ReservationId,
    shutdown_tx: Arc<watch::Sender<bool>>,
    state_rx: watch::Receiver<ScheduleState>,
    join: Option<JoinHandle<ScheduleOutcome>>,
}

impl ScheduleHandle {
    pub fn reservation_id(&self) -> &ReservationId {
        &self.reservation_id
    }

    pub fn state(&self) -> ScheduleState {
        *self.state_rx.borrow()
    }

    pub fn phase(&self) -> SchedulePhase {
        self.state().phase
    }

    pub fn countdown(&self) -> Countdown {
        self.state().countdown
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.state_rx.clone()
    }

    /// 終端状態なら何もしない
    pub fn cancel(&self) {
        // ignore send error: the task may already be finished
        let _ = self.shutdown_tx.send(true);
    }

    /// 終了を待って結果を返す
    pub async fn wait(mut self) -> ScheduleOutcome {
        let Some(join) = self.join.take() else {
            return ScheduleOutcome::Cancelled;
        };
        match join.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(reservation_id = %self.reservation_id, error = %err, "schedule task failed");
                ScheduleOutcome::Cancelled
            }
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("reservation_id", &self.reservation_id)
            .field("state", &self.state())
            .finish()
    }
}
