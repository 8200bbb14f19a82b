//! File-backed stores - 端末ローカルの key-value ストレージ
//!
//! 1 つの値を 1 つの JSON ファイルに保存します。
//! ファイルが無いことは「未保存」として扱い、エラーにしません。
//! 読めたが JSON として壊れているファイルは `ClientError::Parse` です
//! （I/O の失敗は `ClientError::Storage`）。

use std::io::ErrorKind as IoErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{AuthToken, ClientError, ScheduleRecord};
use crate::ports::{ScheduleStore, TokenStore};

/// JsonFile は型付きの JSON ファイル 1 つ
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Option<T>, ClientError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ClientError::Parse(format!("corrupt {}: {e}", self.path.display())))
    }

    pub async fn write(&self, value: &T) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| storage_error("create", dir, e))?;
        }
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| ClientError::Storage(format!("encode {}: {e}", self.path.display())))?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| storage_error("write", &self.path, e))?;
        debug!(path = %self.path.display(), "stored");
        Ok(())
    }

    pub async fn remove(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> ClientError {
    ClientError::Storage(format!("{action} {}: {err}", path.display()))
}

/// 認証トークンをファイルに保存する TokenStore
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    file: JsonFile<AuthToken>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<AuthToken>, ClientError> {
        self.file.read().await
    }

    async fn save(&self, token: &AuthToken) -> Result<(), ClientError> {
        self.file.write(token).await
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.file.remove().await
    }
}

/// カウントダウンのレコードをファイルに保存する ScheduleStore
#[derive(Debug, Clone)]
pub struct FileScheduleStore {
    file: JsonFile<ScheduleRecord>,
}

impl FileScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl ScheduleStore for FileScheduleStore {
    async fn load(&self) -> Result<Option<ScheduleRecord>, ClientError> {
        self.file.read().await
    }

    async fn save(&self, record: &ScheduleRecord) -> Result<(), ClientError> {
        self.file.write(record).await
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.file.remove().await
    }
}
