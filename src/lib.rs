//! sensei-search
//!
//! リモートのマルチモーダル画像検索サービスを叩くクライアント。
//! 画像/テキストの2モード検索、サムネイルのローカル実体化、
//! OODスコアの可視化（数値 + ティント）を行う。

pub mod backend;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod search;
pub mod session;
pub mod thumbs;

pub use color::{colorize, OodTint};
pub use error::{Result, SenseiError};
pub use search::{MatchRecord, ModeState, SearchMode, SearchOutcome, SearchResponse, SearchSession};
pub use thumbs::{ImageCache, ImageHandle};
