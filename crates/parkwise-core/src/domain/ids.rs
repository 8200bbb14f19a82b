//! Domain identifiers (strongly-typed IDs).
//!
//! サーバ側が発行する ID はクライアントにとって不透明な文字列です。
//! ULID のような構造は仮定せず、受け取った値をそのまま保持します。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。
//! ReservationId と SlotId は同じ `String` を持ちますが混同できません。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// ログやエラーメッセージで使う種別名（例: "reservation"）
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// Display は生の値をそのまま出力します（URL のパスにそのまま使うため）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> &'static str {
        T::kind()
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

/// サーバは slot id を数値で返すことがあるので、数値も文字列として受け付ける
impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(value) => Self::new(value),
            Raw::Number(value) => Self::new(value.to_string()),
        })
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Reservation のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReservationKind {}

impl IdMarker for ReservationKind {
    fn kind() -> &'static str {
        "reservation"
    }
}

/// Slot のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKind {}

impl IdMarker for SlotKind {
    fn kind() -> &'static str {
        "slot"
    }
}

/// Identifier of a Reservation (server-issued, opaque).
pub type ReservationId = Id<ReservationKind>;

/// Identifier of a parking Slot within a location.
pub type SlotId = Id<SlotKind>;
