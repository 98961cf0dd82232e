//! 結果描画モジュール
//!
//! 現在のマッチリストとキャッシュから表示カード列を作る純関数パス。
//! 状態は一切変更せず、呼ばれるたびに全カードを作り直す。

use crate::color::{colorize, OodTint};
use crate::search::MatchRecord;
use crate::thumbs::ImageCache;
use std::path::PathBuf;

/// マッチ1件分の表示カード
#[derive(Debug, Clone)]
pub struct Card {
    pub rank: u32,
    pub caption: String,
    /// 小数2桁固定のOODスコア表示
    pub ood_text: String,
    /// 実体化済みサムネイル。キャッシュ未登録なら省略（エラーではない）
    pub thumbnail: Option<PathBuf>,
    pub tint: OodTint,
}

/// OODスコアの表示形式（小数2桁固定）
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// マッチリストを応答順のままカード列へ変換する
pub fn render_cards(
    matches: &[MatchRecord],
    cache: &ImageCache,
    ood_min: f64,
    ood_max: f64,
) -> Vec<Card> {
    matches
        .iter()
        .map(|m| Card {
            rank: m.rank,
            caption: m.caption.clone(),
            ood_text: format_score(m.ood_score),
            thumbnail: cache.get(&m.path).map(|h| h.local_path.clone()),
            tint: colorize(m.ood_score, ood_min, ood_max),
        })
        .collect()
}
