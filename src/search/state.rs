//! モード別検索状態
//!
//! 各モードは `Idle → Pending → Settled` を遷移する。状態の書き換えは
//! 遷移メソッド経由に限定し、リクエスト毎の連番で追い越された応答を破棄する。

use super::types::{MatchRecord, SearchResponse};

/// 検索モード（2モードは完全に独立）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Image,
    Text,
}

impl SearchMode {
    /// 失敗時のユーザー向けアラート文言
    pub fn alert_message(&self) -> &'static str {
        match self {
            SearchMode::Image => "Image search failed.",
            SearchMode::Text => "Text search failed.",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Image => "画像検索",
            SearchMode::Text => "テキスト検索",
        }
    }
}

/// 1モード分の検索状態
///
/// `matches` は応答毎に丸ごと差し替え（増分パッチはしない）。
/// `loading` はリクエスト発行からsettleまでの間だけtrue。
#[derive(Debug, Clone, Default)]
pub struct ModeState {
    pub matches: Vec<MatchRecord>,
    pub query_ood_score: Option<f64>,
    pub loading: bool,
    seq: u64,
}

impl ModeState {
    /// Pendingへ遷移し、このリクエストの連番を返す
    ///
    /// 前回の結果は応答が来るまで表示し続ける（stale-while-loading）。
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.loading = true;
        self.seq
    }

    /// 成功応答を適用する（loadingはまだ落とさない）
    ///
    /// 追い越された古い連番の応答は破棄し、falseを返す。
    pub fn apply_response(&mut self, seq: u64, response: SearchResponse) -> bool {
        if seq != self.seq {
            return false;
        }
        self.matches = response.results;
        self.query_ood_score = response.query_ood_score;
        true
    }

    /// 成功settle（サムネイル実体化の完了後に呼ぶ）
    pub fn finish(&mut self, seq: u64) -> bool {
        if seq != self.seq {
            return false;
        }
        self.loading = false;
        true
    }

    /// 失敗settle。前回の `matches` / `query_ood_score` には触れない
    pub fn fail(&mut self, seq: u64) -> bool {
        if seq != self.seq {
            return false;
        }
        self.loading = false;
        true
    }

    /// 最新リクエストの連番
    pub fn current_seq(&self) -> u64 {
        self.seq
    }
}
