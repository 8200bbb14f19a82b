//! TokenStore port - 認証トークンのローカル保存
//!
//! ネットワーク呼び出しの直前に毎回読み出します。
//! カウントダウンの流れからは書き込みません（login / register / logout のみ）。

use async_trait::async_trait;

use crate::domain::{AuthToken, ClientError};

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<AuthToken>, ClientError>;

    async fn save(&self, token: &AuthToken) -> Result<(), ClientError>;

    async fn clear(&self) -> Result<(), ClientError>;

    /// 保存済みトークンを取り出す。無ければ `ClientError::Auth`
    async fn require(&self) -> Result<AuthToken, ClientError> {
        self.load()
            .await?
            .ok_or_else(|| ClientError::Auth("no stored token; log in first".to_string()))
    }
}
