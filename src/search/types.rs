use serde::{Deserialize, Serialize};

/// 検索結果1件（サービスのランキング順のまま保持、クライアント側で再ソートしない）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRecord {
    /// 画像リソースへの参照パス（バックエンド相対、ローカルファイルではない）
    #[serde(default)]
    pub path: String,

    /// 1始まりの順位
    #[serde(default)]
    pub rank: u32,

    /// キャプション
    #[serde(default)]
    pub caption: String,

    /// OOD距離（小さいほど分布内）
    #[serde(default)]
    pub ood_score: f64,
}

/// `/search_by_image` / `/search_by_text` 共通のレスポンス形
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// マッチリスト（フィールド欠落時は空リスト、nullにはしない）
    #[serde(default)]
    pub results: Vec<MatchRecord>,

    /// クエリ自体のOODスコア（欠落時は未設定）
    #[serde(default)]
    pub query_ood_score: Option<f64>,
}
