//! 検索ディスパッチャ
//!
//! 画像・テキストの2モードを独立した状態機械として持ち、
//! リクエスト発行 → 応答適用 → サムネイル実体化 → settle の順で遷移させる。
//! 失敗はこの境界で止め、ユーザー向けアラートとして積む（呼び出し側へは伝播しない）。

mod state;
mod types;

pub use state::{ModeState, SearchMode};
pub use types::{MatchRecord, SearchResponse};

use crate::backend::RetrievalBackend;
use crate::error::Result;
use crate::thumbs::{materialize, ImageCache};
use std::path::Path;

/// 1回の検索投入の結末
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 前提条件未達（画像未選択）。エラーではなく何もしない
    Skipped,
    /// 正常にsettleした
    Settled,
    /// 失敗settle（アラート追加済み）
    Failed,
    /// 後続リクエストに追い越され、応答を破棄した
    Superseded,
}

/// 検索セッション（ページ寿命に相当）
///
/// `cache` は両モードで共有し、検索をまたいで追記マージのみ行う。
pub struct SearchSession<B> {
    backend: B,
    pub image: ModeState,
    pub text: ModeState,
    pub cache: ImageCache,
    alerts: Vec<String>,
}

impl<B: RetrievalBackend> SearchSession<B> {
    pub fn new(backend: B) -> Result<Self> {
        Ok(Self {
            backend,
            image: ModeState::default(),
            text: ModeState::default(),
            cache: ImageCache::new()?,
            alerts: Vec::new(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self, mode: SearchMode) -> &ModeState {
        match mode {
            SearchMode::Image => &self.image,
            SearchMode::Text => &self.text,
        }
    }

    /// 溜まったアラートを取り出す（取り出した分はクリア）
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// 画像で検索する。ファイル未指定は何もしない（エラーではない）
    pub async fn search_by_image(&mut self, file: Option<&Path>) -> SearchOutcome {
        let Some(file) = file else {
            return SearchOutcome::Skipped;
        };
        let seq = self.image.begin();
        let outcome = self.backend.search_by_image(file).await;
        self.settle(SearchMode::Image, seq, outcome).await
    }

    /// テキストで検索する。空クエリもそのまま送る
    pub async fn search_by_text(&mut self, query: &str) -> SearchOutcome {
        let seq = self.text.begin();
        let outcome = self.backend.search_by_text(query).await;
        self.settle(SearchMode::Text, seq, outcome).await
    }

    async fn settle(
        &mut self,
        mode: SearchMode,
        seq: u64,
        outcome: Result<SearchResponse>,
    ) -> SearchOutcome {
        let state = match mode {
            SearchMode::Image => &mut self.image,
            SearchMode::Text => &mut self.text,
        };

        match outcome {
            Ok(response) => {
                if !state.apply_response(seq, response) {
                    return SearchOutcome::Superseded;
                }
                // loadingはサムネイル実体化が完了してから落とす
                materialize(&self.backend, &mut self.cache, &state.matches).await;
                state.finish(seq);
                SearchOutcome::Settled
            }
            Err(err) => {
                log::warn!("{}に失敗: {}", mode.label(), err);
                if !state.fail(seq) {
                    return SearchOutcome::Superseded;
                }
                self.alerts.push(mode.alert_message().to_string());
                SearchOutcome::Failed
            }
        }
    }
}
