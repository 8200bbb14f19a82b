//! parkwise-core
//!
//! Core building blocks for the Parkwise parking-reservation client.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, reservation, countdown, state, errors, events, draft, ...）
//! - **ports**: 抽象化レイヤー（Clock, ReservationApi, TokenStore, ScheduleStore, Notifier）
//! - **impls**: 実装（HttpReservationApi, File*Store, InMemory*, TracingNotifier）
//! - **app**: アプリケーションロジック（fetcher, scheduler, expiry, session, builder, ...）
//! - **config**: 設定の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
