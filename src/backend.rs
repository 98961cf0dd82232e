//! リトリーバルサービス連携モジュール
//!
//! サービス契約:
//! - `POST {base}/search_by_image` … multipartフィールド`image`に画像バイナリ
//! - `POST {base}/search_by_text` … JSONボディ `{"query": "..."}`
//! - `GET  {base}{path}` … 結果画像の生バイナリ
//!
//! テストではスタブ実装を差し込めるよう、呼び出し面はトレイトに切り出している。

use crate::config::Config;
use crate::error::{Result, SenseiError};
use crate::search::SearchResponse;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// ngrokトンネル経由時に警告ページを回避するヘッダ（契約上は任意）
pub const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// リトリーバルサービスの呼び出し面
#[async_trait]
pub trait RetrievalBackend {
    /// 画像で類似検索
    async fn search_by_image(&self, image: &Path) -> Result<SearchResponse>;

    /// テキストで検索
    async fn search_by_text(&self, query: &str) -> Result<SearchResponse>;

    /// 結果画像の生バイナリを取得
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct TextQuery<'a> {
    query: &'a str,
}

/// reqwestによる本番実装
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    ngrok_skip_header: bool,
}

impl HttpBackend {
    pub fn new(base_url: String, config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            ngrok_skip_header: config.ngrok_skip_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.ngrok_skip_header {
            builder.header(NGROK_SKIP_HEADER, "true")
        } else {
            builder
        }
    }

    async fn parse_search_response(response: reqwest::Response) -> Result<SearchResponse> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SenseiError::ApiCall(format!(
                "ステータス {}: {}",
                status,
                preview(&body)
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| SenseiError::ApiParse(format!("{} (body: {})", e, preview(&text))))
    }
}

#[async_trait]
impl RetrievalBackend for HttpBackend {
    async fn search_by_image(&self, image: &Path) -> Result<SearchResponse> {
        if !image.exists() {
            return Err(SenseiError::FileNotFound(image.display().to_string()));
        }

        let bytes = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("image", part);

        let response = self
            .apply_headers(self.client.post(self.endpoint("/search_by_image")))
            .multipart(form)
            .send()
            .await?;

        Self::parse_search_response(response).await
    }

    async fn search_by_text(&self, query: &str) -> Result<SearchResponse> {
        let response = self
            .apply_headers(self.client.post(self.endpoint("/search_by_text")))
            .json(&TextQuery { query })
            .send()
            .await?;

        Self::parse_search_response(response).await
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .apply_headers(self.client.get(self.endpoint(path)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SenseiError::ApiCall(format!(
                "画像取得失敗 (ステータス {}): {}",
                status, path
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// エラーメッセージ用にボディ先頭だけ切り出す
fn preview(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
