use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sensei-search")]
#[command(about = "マルチモーダル画像検索クライアント（OODスコア可視化）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細出力（カードのティント等も表示）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドURLを一時的に上書き
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像ファイルで類似画像を検索
    Image {
        /// クエリ画像のパス
        #[arg(required = true)]
        file: PathBuf,
    },

    /// テキストで画像を検索
    Text {
        /// 検索クエリ
        #[arg(required = true)]
        query: String,
    },

    /// 対話セッション（検索をまたいでサムネイルキャッシュを共有）
    Session,

    /// 設定を表示/編集
    Config {
        /// バックエンドURLを設定
        #[arg(long)]
        set_backend_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
