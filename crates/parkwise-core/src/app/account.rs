//! AccountService - ログイン・登録・ログアウト・プロフィール
//!
//! トークンを書き込むのはここだけです。

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ClientError, Credentials, Notification, Profile, Registration};
use crate::ports::{Notifier, ReservationApi, TokenStore};

pub struct AccountService {
    api: Arc<dyn ReservationApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tokens,
            notifier,
        }
    }

    /// `POST /login` してトークンを保存
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let result = self.try_login(credentials).await;
        self.report("login", result, "Logged in successfully")
    }

    /// `POST /register` してトークンを保存
    pub async fn register(&self, registration: &Registration) -> Result<(), ClientError> {
        let result = self.try_register(registration).await;
        self.report("register", result, "Registered successfully")
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.tokens.clear().await;
        self.report("logout", result, "Logged out")
    }

    pub async fn is_logged_in(&self) -> Result<bool, ClientError> {
        Ok(self.tokens.load().await?.is_some())
    }

    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let result = self.try_profile().await;
        if let Err(err) = &result {
            warn!(error = %err, "profile fetch failed");
            self.notifier.notify(Notification::from_error(err));
        }
        result
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        credentials.validate()?;
        let token = self.api.login(credentials).await?;
        self.tokens.save(&token).await
    }

    async fn try_register(&self, registration: &Registration) -> Result<(), ClientError> {
        let token = self.api.register(registration).await?;
        self.tokens.save(&token).await
    }

    async fn try_profile(&self) -> Result<Profile, ClientError> {
        let token = self.tokens.require().await?;
        self.api.profile(&token).await
    }

    fn report(
        &self,
        action: &'static str,
        result: Result<(), ClientError>,
        success: &str,
    ) -> Result<(), ClientError> {
        match &result {
            Ok(()) => {
                info!(action, "account updated");
                self.notifier.notify(Notification::success("Success", success));
            }
            Err(err) => {
                warn!(action, kind = ?err.kind(), error = %err, "account operation failed");
                self.notifier.notify(Notification::from_error(err));
            }
        }
        result
    }
}
