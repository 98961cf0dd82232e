//! サムネイル実体化モジュール
//!
//! 検索結果の参照パスをバックエンドから取得し、ローカルに表示可能な
//! ハンドルへ変換してパスをキーにキャッシュする。
//! キャッシュは追記マージのみで、破棄時にディレクトリごとハンドルを解放する。

use crate::backend::RetrievalBackend;
use crate::error::{Result, SenseiError};
use crate::search::MatchRecord;
use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// ローカルに実体化された表示ハンドル
#[derive(Debug, Clone)]
pub struct ImageHandle {
    /// ローカルファイルのパス
    pub local_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub byte_len: u64,
}

/// 参照パス → 表示ハンドルのキャッシュ（セッション寿命）
///
/// エントリは検索をまたいで追記され、明示的な破棄まで消えない。
/// ハンドルの実体（ファイル）の所有権はこのキャッシュが持つ。
pub struct ImageCache {
    dir: TempDir,
    entries: HashMap<String, ImageHandle>,
}

impl ImageCache {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
            entries: HashMap::new(),
        })
    }

    pub fn get(&self, path: &str) -> Option<&ImageHandle> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 実体化先ディレクトリ
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// 取得済みバイト列をデコード検証し、ファイルへ書き出して登録する
    ///
    /// 同一キーへの再登録は上書き（後勝ち）。
    pub fn insert_bytes(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| SenseiError::ImageDecode(format!("{}: {}", path, e)))?;

        let local_path = self.dir.path().join(local_file_name(path));
        std::fs::write(&local_path, bytes)?;

        self.entries.insert(
            path.to_string(),
            ImageHandle {
                local_path,
                width: decoded.width(),
                height: decoded.height(),
                byte_len: bytes.len() as u64,
            },
        );
        Ok(())
    }
}

/// バッチ内の未キャッシュ参照パスを収集する（パスで重複排除、応答順を維持）
fn pending_paths(matches: &[MatchRecord], cache: &ImageCache) -> Vec<String> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .filter(|m| !m.path.is_empty())
        .filter(|m| !cache.contains(&m.path))
        .filter_map(|m| {
            if seen.insert(m.path.clone()) {
                Some(m.path.clone())
            } else {
                None
            }
        })
        .collect()
}

/// バッチ一括でサムネイルを実体化する
///
/// 全フェッチを同時に発行し、全件がsettleしてからキャッシュへマージする。
/// 個別の失敗はログに残すだけでバッチを止めない（キーは未登録のまま）。
/// 戻り値は新規登録件数。
pub async fn materialize<B: RetrievalBackend>(
    backend: &B,
    cache: &mut ImageCache,
    matches: &[MatchRecord],
) -> usize {
    let pending = pending_paths(matches, cache);
    if pending.is_empty() {
        return 0;
    }

    let fetches = pending
        .iter()
        .map(|path| async move { (path.as_str(), backend.fetch_image(path).await) });
    let settled = join_all(fetches).await;

    let mut inserted = 0;
    for (path, outcome) in settled {
        match outcome {
            Ok(bytes) => match cache.insert_bytes(path, &bytes) {
                Ok(()) => inserted += 1,
                Err(err) => log::warn!("サムネイルの登録に失敗: {}: {}", path, err),
            },
            Err(err) => log::warn!("サムネイルの取得に失敗: {}: {}", path, err),
        }
    }

    inserted
}

/// 参照パスからローカルファイル名を導出する（sha256ハッシュ + 元の拡張子）
///
/// 参照パスには`/`等が含まれるため、そのままファイル名には使えない。
fn local_file_name(path: &str) -> String {
    let digest = hex::encode(Sha256::digest(path.as_bytes()));
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", digest, ext),
        _ => digest,
    }
}
