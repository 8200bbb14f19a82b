//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - port の差し替え（テストでは in-memory 実装を渡す）

use std::sync::Arc;

use reqwest::Url;

use super::account::AccountService;
use super::booking::BookingService;
use super::expiry::ExpiryHandler;
use super::fetcher::ReservationFetcher;
use super::held::HeldReservation;
use super::scheduler::ExpiryScheduler;
use super::session::CountdownSession;
use crate::config::Config;
use crate::domain::ClientError;
use crate::impls::{FileScheduleStore, FileTokenStore, HttpReservationApi, TracingNotifier};
use crate::ports::{Clock, Notifier, ReservationApi, ScheduleStore, SystemClock, TokenStore};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Config::load()?)
///     .with_notifier(Arc::new(TracingNotifier))
///     .build()?;
/// let handle = app.session.open(&id).await?;
/// ```
///
/// # Fail-fast 設計
/// - base URL が解釈できなければ BuildError::InvalidBaseUrl
/// - tick が 0 なら BuildError::ZeroTick
/// - 差し替えていない port は設定から本番実装を作る
pub struct AppBuilder {
    config: Config,
    api: Option<Arc<dyn ReservationApi>>,
    clock: Option<Arc<dyn Clock>>,
    tokens: Option<Arc<dyn TokenStore>>,
    schedules: Option<Arc<dyn ScheduleStore>>,
    notifier: Option<Arc<dyn Notifier>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid api.base_url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("countdown.tick_ms must be greater than zero")]
    ZeroTick,

    #[error("failed to create the http client: {0}")]
    Client(#[source] ClientError),
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            api: None,
            clock: None,
            tokens: None,
            schedules: None,
            notifier: None,
        }
    }

    pub fn with_api(mut self, api: Arc<dyn ReservationApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_schedule_store(mut self, schedules: Arc<dyn ScheduleStore>) -> Self {
        self.schedules = Some(schedules);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// AppBuilder を構築して App を生成
    pub fn build(self) -> Result<App, BuildError> {
        let config = self.config;
        if config.countdown.tick_ms == 0 {
            return Err(BuildError::ZeroTick);
        }
        let base_url = parse_base_url(&config.api.base_url)?;

        let api: Arc<dyn ReservationApi> = match self.api {
            Some(api) => api,
            None => Arc::new(
                HttpReservationApi::new(base_url.clone(), config.timeout())
                    .map_err(BuildError::Client)?,
            ),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(FileTokenStore::new(config.token_path())));
        let schedules = self
            .schedules
            .unwrap_or_else(|| Arc::new(FileScheduleStore::new(config.schedule_path())));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let held = HeldReservation::new();

        let handler = Arc::new(ExpiryHandler::new(
            Arc::clone(&api),
            Arc::clone(&tokens),
            Arc::clone(&schedules),
            held.clone(),
            Arc::clone(&notifier),
        ));
        let scheduler = ExpiryScheduler::new(clock, config.tick());
        let running = scheduler.active();
        let session = CountdownSession::new(
            ReservationFetcher::new(Arc::clone(&api), Arc::clone(&tokens), Arc::clone(&notifier)),
            scheduler,
            handler,
            Arc::clone(&schedules),
            held.clone(),
            Arc::clone(&notifier),
        );
        let accounts = AccountService::new(Arc::clone(&api), Arc::clone(&tokens), Arc::clone(&notifier));
        let bookings = BookingService::new(api, tokens, schedules, held, running, notifier);

        Ok(App {
            base_url,
            session,
            accounts,
            bookings,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, BuildError> {
    let invalid = |reason: String| BuildError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be a base".to_string()));
    }
    Ok(url)
}

/// App は構築済みのアプリケーション
pub struct App {
    pub base_url: Url,
    pub session: CountdownSession,
    pub accounts: AccountService,
    pub bookings: BookingService,
}
