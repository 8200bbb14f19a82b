//! Account - 認証トークンと資格情報

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// AuthToken はサービスが発行する bearer token
///
/// Debug / Display では値を伏せます（ログへの漏えい防止）。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Authorization ヘッダに載せる生の値
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(********)")
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

/// `POST /login` のボディ
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// `POST /register` のボディ
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// 確認用パスワードはローカルで照合し、サーバには送らない
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: &str,
    ) -> Result<Self, ValidationError> {
        let registration = Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        };
        if registration.password != confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if registration.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        Credentials::new(registration.email.clone(), registration.password.clone()).validate()?;
        Ok(registration)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// login / register の応答
#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    pub token: Option<AuthToken>,
}
