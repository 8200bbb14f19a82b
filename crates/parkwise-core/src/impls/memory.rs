//! In-memory implementations - 開発用・テスト用
//!
//! # 学習ポイント
//! - `std::sync::Mutex` はロックを await の向こうに持ち越さない前提で使う
//! - テストから観測できるように、リクエストの履歴を残す

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{
    AuthToken, ClientError, Credentials, Profile, Registration, Reservation, ReservationId,
    ReservationRequest, ScheduleRecord, Slot,
};
use crate::ports::{ReservationApi, ScheduleStore, TokenStore};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<AuthToken>, ClientError> {
        Ok(locked(&self.token).clone())
    }

    async fn save(&self, token: &AuthToken) -> Result<(), ClientError> {
        *locked(&self.token) = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *locked(&self.token) = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    record: Mutex<Option<ScheduleRecord>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: ScheduleRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    pub fn current(&self) -> Option<ScheduleRecord> {
        locked(&self.record).clone()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn load(&self) -> Result<Option<ScheduleRecord>, ClientError> {
        Ok(self.current())
    }

    async fn save(&self, record: &ScheduleRecord) -> Result<(), ClientError> {
        *locked(&self.record) = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *locked(&self.record) = None;
        Ok(())
    }
}

/// 登録済みユーザー
#[derive(Debug, Clone)]
struct Account {
    password: String,
    token: AuthToken,
    profile: Profile,
}

#[derive(Debug, Default)]
struct ApiState {
    accounts: HashMap<String, Account>,
    tokens: HashSet<String>,
    reservations: HashMap<ReservationId, Reservation>,
    slots: HashMap<String, Vec<Slot>>,
    saved: Vec<(ReservationId, f64)>,
    fetch_requests: Vec<ReservationId>,
    delete_requests: Vec<ReservationId>,
    delete_failure: Option<(u16, String)>,
    next_id: u64,
}

impl ApiState {
    fn authorize(&self, token: &AuthToken) -> Result<(), ClientError> {
        if self.tokens.contains(token.expose()) {
            Ok(())
        } else {
            Err(ClientError::Auth("Invalid token".to_string()))
        }
    }

    fn issue_token(&mut self, email: &str) -> AuthToken {
        self.next_id += 1;
        let token = AuthToken::new(format!("token-{}-{email}", self.next_id));
        self.tokens.insert(token.expose().to_string());
        token
    }
}

/// InMemoryReservationApi はサーバの振る舞いを最小限まねる
///
/// # 使用例
/// ```ignore
/// let api = InMemoryReservationApi::new()
///     .with_token(AuthToken::new("t"))
///     .with_reservation(reservation);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryReservationApi {
    state: Mutex<ApiState>,
}

impl InMemoryReservationApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` on authenticated calls.
    pub fn with_token(self, token: AuthToken) -> Self {
        locked(&self.state).tokens.insert(token.expose().to_string());
        self
    }

    pub fn with_reservation(self, reservation: Reservation) -> Self {
        locked(&self.state)
            .reservations
            .insert(reservation.id.clone(), reservation);
        self
    }

    pub fn with_slots(self, location: &str, slots: Vec<Slot>) -> Self {
        locked(&self.state).slots.insert(location.to_string(), slots);
        self
    }

    /// 以降の削除リクエストを `status` / `message` で失敗させる
    pub fn fail_deletes_with(self, status: u16, message: &str) -> Self {
        locked(&self.state).delete_failure = Some((status, message.to_string()));
        self
    }

    pub fn contains(&self, id: &ReservationId) -> bool {
        locked(&self.state).reservations.contains_key(id)
    }

    pub fn fetch_requests(&self) -> Vec<ReservationId> {
        locked(&self.state).fetch_requests.clone()
    }

    pub fn delete_requests(&self) -> Vec<ReservationId> {
        locked(&self.state).delete_requests.clone()
    }

    pub fn saved_reservations(&self) -> Vec<(ReservationId, f64)> {
        locked(&self.state).saved.clone()
    }
}

#[async_trait]
impl ReservationApi for InMemoryReservationApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ClientError> {
        let state = locked(&self.state);
        match state.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => Ok(account.token.clone()),
            _ => Err(ClientError::Service {
                status: 400,
                message: "Invalid credentials".to_string(),
            }),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthToken, ClientError> {
        let mut state = locked(&self.state);
        if state.accounts.contains_key(&registration.email) {
            return Err(ClientError::Service {
                status: 400,
                message: "User already exists".to_string(),
            });
        }
        let token = state.issue_token(&registration.email);
        let profile = Profile {
            name: registration.name.clone(),
            email: registration.email.clone(),
            ..Profile::default()
        };
        state.accounts.insert(
            registration.email.clone(),
            Account {
                password: registration.password.clone(),
                token: token.clone(),
                profile,
            },
        );
        Ok(token)
    }

    async fn profile(&self, token: &AuthToken) -> Result<Profile, ClientError> {
        let state = locked(&self.state);
        state.authorize(token)?;
        state
            .accounts
            .values()
            .find(|account| &account.token == token)
            .map(|account| account.profile.clone())
            .ok_or_else(|| ClientError::Service {
                status: 404,
                message: "User not found".to_string(),
            })
    }

    async fn slots(&self, token: &AuthToken, location: &str) -> Result<Vec<Slot>, ClientError> {
        let state = locked(&self.state);
        state.authorize(token)?;
        Ok(state.slots.get(location).cloned().unwrap_or_default())
    }

    async fn create_reservation(
        &self,
        token: &AuthToken,
        request: &ReservationRequest,
    ) -> Result<ReservationId, ClientError> {
        let mut state = locked(&self.state);
        state.authorize(token)?;
        state.next_id += 1;
        let id = ReservationId::new(format!("res-{}", state.next_id));
        let mut reservation = Reservation::new(id.clone(), request.start_time, request.end_time);
        reservation.parking_location = Some(request.parking_location.clone());
        reservation.total_charges = Some(request.total_charges);
        state.reservations.insert(id.clone(), reservation);
        Ok(id)
    }

    async fn save_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
        total_charges: f64,
    ) -> Result<(), ClientError> {
        let mut state = locked(&self.state);
        state.authorize(token)?;
        state.saved.push((id.clone(), total_charges));
        Ok(())
    }

    async fn reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<Reservation, ClientError> {
        let mut state = locked(&self.state);
        state.authorize(token)?;
        state.fetch_requests.push(id.clone());
        state
            .reservations
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::Service {
                status: 404,
                message: "Reservation not found".to_string(),
            })
    }

    async fn delete_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<(), ClientError> {
        let mut state = locked(&self.state);
        state.authorize(token)?;
        state.delete_requests.push(id.clone());
        if let Some((status, message)) = state.delete_failure.clone() {
            return Err(ClientError::Service { status, message });
        }
        match state.reservations.remove(id) {
            Some(_) => Ok(()),
            None => Err(ClientError::Service {
                status: 404,
                message: "Reservation not found".to_string(),
            }),
        }
    }

    async fn create_payment_intent(&self, amount_cents: u64) -> Result<String, ClientError> {
        Ok(format!("pi_{amount_cents}_secret"))
    }
}
