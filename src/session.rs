//! 対話セッションモジュール
//!
//! 1つの`SearchSession`を使い回し、画像・テキスト検索を交互に受け付ける。
//! サムネイルキャッシュは検索をまたいで共有され、終了時にまとめて解放される。

use crate::backend::RetrievalBackend;
use crate::config::Config;
use crate::error::{Result, SenseiError};
use crate::render::{format_score, render_cards};
use crate::search::{SearchMode, SearchOutcome, SearchSession};
use dialoguer::Input;
use std::path::PathBuf;

/// 対話アクション
enum SessionAction {
    /// テキスト検索
    Text(String),
    /// 画像検索（パス未指定はそのまま渡して no-op にする）
    Image(Option<PathBuf>),
    /// キャッシュ情報を表示
    Status,
    /// 終了
    Quit,
    /// 解釈できない入力
    Unknown,
}

/// 対話セッションを実行する
pub async fn run_session<B: RetrievalBackend>(
    config: &Config,
    backend: B,
    verbose: bool,
) -> Result<()> {
    let mut session = SearchSession::new(backend)?;

    println!("🔍 sensei-search 対話セッション");
    println!("---");
    println!("操作: [t <クエリ>]テキスト検索 [i <画像パス>]画像検索 [c]キャッシュ情報 [q]終了");
    println!("---\n");

    loop {
        match prompt_action()? {
            SessionAction::Text(query) => {
                let outcome = session.search_by_text(&query).await;
                print_report(&mut session, SearchMode::Text, outcome, config, verbose);
            }
            SessionAction::Image(path) => {
                let outcome = session.search_by_image(path.as_deref()).await;
                print_report(&mut session, SearchMode::Image, outcome, config, verbose);
            }
            SessionAction::Status => {
                println!(
                    "  キャッシュ: {}件 ({})\n",
                    session.cache.len(),
                    session.cache.dir().display()
                );
            }
            SessionAction::Quit => break,
            SessionAction::Unknown => {
                println!("  操作: t <クエリ> / i <画像パス> / c / q\n");
            }
        }
    }

    println!("✓ セッション終了（サムネイルキャッシュを解放します）");
    Ok(())
}

/// 検索結果を表示する
///
/// アラート出力 → クエリOOD → カード列の順。描画自体は`render_cards`の純関数パス。
pub fn print_report<B: RetrievalBackend>(
    session: &mut SearchSession<B>,
    mode: SearchMode,
    outcome: SearchOutcome,
    config: &Config,
    verbose: bool,
) {
    for alert in session.take_alerts() {
        eprintln!("⚠ {}", alert);
    }

    match outcome {
        SearchOutcome::Skipped => {
            println!("  → 画像が未選択のため何もしませんでした\n");
            return;
        }
        SearchOutcome::Failed | SearchOutcome::Superseded => return,
        SearchOutcome::Settled => {}
    }

    let state = session.state(mode);
    if let Some(score) = state.query_ood_score {
        println!("クエリOOD: {}", format_score(score));
    }

    let cards = render_cards(&state.matches, &session.cache, config.ood_min, config.ood_max);
    if cards.is_empty() {
        println!("マッチなし\n");
        return;
    }

    for card in &cards {
        match &card.thumbnail {
            Some(path) => println!(
                "{}. {} [OOD {}] {}",
                card.rank,
                card.caption,
                card.ood_text,
                path.display()
            ),
            None => println!("{}. {} [OOD {}]", card.rank, card.caption, card.ood_text),
        }
        if verbose {
            println!("   tint: {}", card.tint.to_css());
        }
    }
    println!();
}

fn prompt_action() -> Result<SessionAction> {
    let input: String = Input::new()
        .with_prompt("検索")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| SenseiError::Prompt(e.to_string()))?;

    Ok(parse_action(&input))
}

fn parse_action(input: &str) -> SessionAction {
    let trimmed = input.trim();

    if let Some(query) = trimmed.strip_prefix("t ") {
        return SessionAction::Text(query.trim().to_string());
    }
    if let Some(path) = trimmed.strip_prefix("i ") {
        let path = path.trim();
        if path.is_empty() {
            return SessionAction::Image(None);
        }
        return SessionAction::Image(Some(PathBuf::from(path)));
    }

    match trimmed {
        // 空クエリもそのまま送る（サービス側の仕様）
        "t" => SessionAction::Text(String::new()),
        "i" => SessionAction::Image(None),
        "c" => SessionAction::Status,
        "q" | "Q" => SessionAction::Quit,
        _ => SessionAction::Unknown,
    }
}
