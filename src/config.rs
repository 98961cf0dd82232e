use crate::error::{Result, SenseiError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// バックエンドURLを上書きする環境変数
pub const BACKEND_URL_ENV: &str = "SENSEI_BACKEND_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// リトリーバルサービスのベースURL
    pub backend_url: Option<String>,
    /// OODスコアの表示レンジ下限
    pub ood_min: f64,
    /// OODスコアの表示レンジ上限
    pub ood_max: f64,
    /// ngrok警告スキップヘッダを付与する（トンネル経由時の互換措置）
    pub ngrok_skip_header: bool,
    /// HTTPリクエストのタイムアウト秒数
    pub timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SenseiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sensei-search").join("config.json"))
    }

    pub fn set_backend_url(&mut self, url: String) -> Result<()> {
        self.backend_url = Some(normalize_base_url(&url));
        self.save()
    }

    /// バックエンドURLを解決する
    ///
    /// 優先順位: CLI引数 > 環境変数 > 設定ファイル
    pub fn resolve_backend_url(&self, cli_override: Option<&str>) -> Result<String> {
        if let Some(url) = cli_override {
            if !url.trim().is_empty() {
                return Ok(normalize_base_url(url));
            }
        }

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(normalize_base_url(&url));
            }
        }

        self.backend_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(normalize_base_url)
            .ok_or(SenseiError::MissingBackendUrl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            ood_min: 0.0,
            ood_max: 20.0,
            ngrok_skip_header: true,
            timeout_seconds: 30,
        }
    }
}

/// 末尾スラッシュを除去（参照パスは`/`始まりで連結するため）
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
