//! Config - 設定の読み込み
//!
//! # 優先順位（後勝ち）
//! 1. 組み込みのデフォルト値
//! 2. `config/default`（任意）
//! 3. `config/{RUN_MODE}`（任意、デフォルトは development）
//! 4. `config/local`（任意、git 管理外）
//! 5. 環境変数 `PARKWISE__API__BASE_URL` など

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://parking-api-alpha.vercel.app";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub countdown: CountdownConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountdownConfig {
    pub tick_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PARKWISE").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_ms", 10_000_i64)?
            .set_default("countdown.tick_ms", 1_000_i64)?
            .set_default("storage.dir", ".parkwise")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.countdown.tick_ms)
    }

    pub fn token_path(&self) -> PathBuf {
        self.storage.dir.join("token.json")
    }

    pub fn schedule_path(&self) -> PathBuf {
        self.storage.dir.join("schedule.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_ms: 10_000,
            },
            countdown: CountdownConfig { tick_ms: 1_000 },
            storage: StorageConfig {
                dir: PathBuf::from(".parkwise"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn defaults_match_default_impl() {
        let config: Config = Config::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert_eq!(config.token_path(), PathBuf::from(".parkwise/token.json"));
    }

    #[test]
    fn file_values_override_defaults() {
        let toml = r#"
            [api]
            base_url = "http://localhost:4000"

            [countdown]
            tick_ms = 250
        "#;
        let config: Config = Config::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:4000");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.tick(), Duration::from_millis(250));
    }
}
