//! 検索セッションテスト
//!
//! スタブバックエンドでディスパッチ・サムネイル実体化・描画の連携を検証

use async_trait::async_trait;
use sensei_search::backend::RetrievalBackend;
use sensei_search::error::{Result, SenseiError};
use sensei_search::render::render_cards;
use sensei_search::thumbs::{materialize, ImageCache};
use sensei_search::{MatchRecord, SearchOutcome, SearchResponse, SearchSession};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

const OOD_MIN: f64 = 0.0;
const OOD_MAX: f64 = 20.0;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([128, 128, 128, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn record(path: &str, rank: u32, caption: &str, ood: f64) -> MatchRecord {
    MatchRecord {
        path: path.into(),
        rank,
        caption: caption.into(),
        ood_score: ood,
    }
}

/// 応答をスクリプト再生し、画像フェッチを記録するスタブ
#[derive(Default)]
struct StubBackend {
    /// 先頭から順に消費される検索応答
    responses: Mutex<Vec<Result<SearchResponse>>>,
    /// 参照パス → 画像バイナリ（未登録パスはフェッチ失敗）
    images: HashMap<String, Vec<u8>>,
    /// 発行されたフェッチの記録
    fetch_log: Mutex<Vec<String>>,
}

impl StubBackend {
    fn with_response(response: SearchResponse) -> Self {
        Self {
            responses: Mutex::new(vec![Ok(response)]),
            ..Default::default()
        }
    }

    fn push_response(&self, response: Result<SearchResponse>) {
        self.responses.lock().unwrap().push(response);
    }

    fn add_image(&mut self, path: &str, bytes: Vec<u8>) {
        self.images.insert(path.to_string(), bytes);
    }

    fn next_response(&self) -> Result<SearchResponse> {
        let mut queue = self.responses.lock().unwrap();
        if queue.is_empty() {
            return Err(SenseiError::ApiCall("スタブに応答が未登録".into()));
        }
        queue.remove(0)
    }

    fn fetched_paths(&self) -> Vec<String> {
        self.fetch_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalBackend for StubBackend {
    async fn search_by_image(&self, _image: &Path) -> Result<SearchResponse> {
        self.next_response()
    }

    async fn search_by_text(&self, _query: &str) -> Result<SearchResponse> {
        self.next_response()
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>> {
        self.fetch_log.lock().unwrap().push(path.to_string());
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| SenseiError::ApiCall(format!("画像なし: {}", path)))
    }
}

/// 具体シナリオ: "red car" のテキスト検索
#[tokio::test]
async fn test_text_search_red_car_scenario() {
    let mut backend = StubBackend::with_response(SearchResponse {
        results: vec![record("/img/1.jpg", 1, "a red car", 3.5)],
        query_ood_score: Some(2.1),
    });
    backend.add_image("/img/1.jpg", png_bytes());

    let mut session = SearchSession::new(backend).unwrap();
    let outcome = session.search_by_text("red car").await;

    assert_eq!(outcome, SearchOutcome::Settled);
    assert!(!session.text.loading);
    assert!(session.alerts().is_empty());
    assert_eq!(session.text.query_ood_score, Some(2.1));

    let cards = render_cards(&session.text.matches, &session.cache, OOD_MIN, OOD_MAX);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].rank, 1);
    assert_eq!(cards[0].caption, "a red car");
    assert_eq!(cards[0].ood_text, "3.50");
    assert!(cards[0].thumbnail.is_some());

    use sensei_search::render::format_score;
    assert_eq!(format_score(session.text.query_ood_score.unwrap()), "2.10");
}

/// 空の結果 + スコア欠落の成功応答
#[tokio::test]
async fn test_empty_results_settles_without_alert() {
    let backend = StubBackend::with_response(SearchResponse::default());
    let mut session = SearchSession::new(backend).unwrap();

    let outcome = session.search_by_image(Some(Path::new("/tmp/query.jpg"))).await;

    assert_eq!(outcome, SearchOutcome::Settled);
    assert!(session.image.matches.is_empty());
    assert!(session.image.query_ood_score.is_none());
    assert!(!session.image.loading);
    assert!(session.alerts().is_empty());
}

/// 失敗したテキスト検索は前回の状態を保持し、アラートをちょうど1件積む
#[tokio::test]
async fn test_text_failure_keeps_state_and_alerts_once() {
    let mut backend = StubBackend::with_response(SearchResponse {
        results: vec![record("/img/1.jpg", 1, "first", 2.0)],
        query_ood_score: Some(1.5),
    });
    backend.add_image("/img/1.jpg", png_bytes());
    backend.push_response(Err(SenseiError::ApiCall("接続失敗".into())));

    let mut session = SearchSession::new(backend).unwrap();
    session.search_by_text("first").await;

    let outcome = session.search_by_text("second").await;
    assert_eq!(outcome, SearchOutcome::Failed);

    // 前回の結果は温存、loadingだけ落ちる
    assert_eq!(session.text.matches.len(), 1);
    assert_eq!(session.text.matches[0].caption, "first");
    assert_eq!(session.text.query_ood_score, Some(1.5));
    assert!(!session.text.loading);

    let alerts = session.take_alerts();
    assert_eq!(alerts, vec!["Text search failed.".to_string()]);
}

/// 画像検索の失敗は画像モード用の文言になる
#[tokio::test]
async fn test_image_failure_alert_message() {
    let backend = StubBackend {
        responses: Mutex::new(vec![Err(SenseiError::ApiCall("接続失敗".into()))]),
        ..Default::default()
    };
    let mut session = SearchSession::new(backend).unwrap();

    let outcome = session.search_by_image(Some(Path::new("/tmp/q.jpg"))).await;
    assert_eq!(outcome, SearchOutcome::Failed);
    assert_eq!(session.take_alerts(), vec!["Image search failed.".to_string()]);
}

/// 画像未選択は何もしない（エラーでもアラートでもない）
#[tokio::test]
async fn test_image_search_without_file_is_noop() {
    let backend = StubBackend::with_response(SearchResponse::default());
    let mut session = SearchSession::new(backend).unwrap();

    let outcome = session.search_by_image(None).await;

    assert_eq!(outcome, SearchOutcome::Skipped);
    assert!(!session.image.loading);
    assert!(session.alerts().is_empty());
    assert_eq!(session.image.current_seq(), 0);
}

/// バッチ内の重複パスは1回だけフェッチされる
#[tokio::test]
async fn test_materialize_dedupes_fetches() {
    let mut backend = StubBackend::with_response(SearchResponse {
        results: vec![
            record("/img/a.jpg", 1, "a", 1.0),
            record("/img/b.jpg", 2, "b", 2.0),
            record("/img/a.jpg", 3, "a again", 3.0),
        ],
        query_ood_score: None,
    });
    backend.add_image("/img/a.jpg", png_bytes());
    backend.add_image("/img/b.jpg", png_bytes());

    let mut session = SearchSession::new(backend).unwrap();
    session.search_by_text("dup").await;

    let mut fetched = session.backend().fetched_paths();
    fetched.sort();
    assert_eq!(fetched, vec!["/img/a.jpg".to_string(), "/img/b.jpg".to_string()]);
    assert_eq!(session.cache.len(), 2);
}

/// 一部のフェッチ失敗は成功分に影響せず、バッチ完了は通知される
#[tokio::test]
async fn test_materialize_partial_failure() {
    let mut backend = StubBackend::default();
    backend.add_image("/img/ok.jpg", png_bytes());

    let mut cache = ImageCache::new().unwrap();
    let matches = vec![
        record("/img/ok.jpg", 1, "ok", 1.0),
        record("/img/missing.jpg", 2, "missing", 2.0),
    ];

    let inserted = materialize(&backend, &mut cache, &matches).await;

    assert_eq!(inserted, 1);
    assert!(cache.contains("/img/ok.jpg"));
    assert!(!cache.contains("/img/missing.jpg"));

    // 失敗したパスのカードはサムネイル省略で描画される
    let cards = render_cards(&matches, &cache, OOD_MIN, OOD_MAX);
    assert!(cards[0].thumbnail.is_some());
    assert!(cards[1].thumbnail.is_none());
}

/// キャッシュ済みパスは再フェッチされない（検索をまたいだマージ）
#[tokio::test]
async fn test_cache_merges_across_searches() {
    let mut backend = StubBackend::with_response(SearchResponse {
        results: vec![record("/img/a.jpg", 1, "a", 1.0)],
        query_ood_score: None,
    });
    backend.add_image("/img/a.jpg", png_bytes());
    backend.add_image("/img/b.jpg", png_bytes());
    backend.push_response(Ok(SearchResponse {
        results: vec![
            record("/img/a.jpg", 1, "a", 1.0),
            record("/img/b.jpg", 2, "b", 2.0),
        ],
        query_ood_score: None,
    }));

    let mut session = SearchSession::new(backend).unwrap();
    session.search_by_text("first").await;
    assert_eq!(session.cache.len(), 1);

    session.search_by_text("second").await;

    // 2回目は未キャッシュの/b.jpgだけフェッチし、キャッシュは両バッチの和集合
    assert_eq!(session.cache.len(), 2);
    let fetched = session.backend().fetched_paths();
    assert_eq!(fetched, vec!["/img/a.jpg".to_string(), "/img/b.jpg".to_string()]);
}

/// 2モードは互いに独立（片方の失敗がもう片方に波及しない）
#[tokio::test]
async fn test_modes_are_independent() {
    let mut backend = StubBackend::with_response(SearchResponse {
        results: vec![record("/img/t.jpg", 1, "text hit", 1.0)],
        query_ood_score: Some(0.5),
    });
    backend.add_image("/img/t.jpg", png_bytes());
    backend.push_response(Err(SenseiError::ApiCall("接続失敗".into())));

    let mut session = SearchSession::new(backend).unwrap();
    session.search_by_text("hello").await;
    session.search_by_image(Some(Path::new("/tmp/q.jpg"))).await;

    assert_eq!(session.text.matches.len(), 1);
    assert_eq!(session.text.query_ood_score, Some(0.5));
    assert!(session.image.matches.is_empty());
    assert_eq!(session.take_alerts(), vec!["Image search failed.".to_string()]);
}

/// 連続投入（前バッチの実体化中に再投入相当）でもキャッシュは両バッチの和集合になる
#[tokio::test]
async fn test_rapid_resubmission_unions_cache() {
    let mut backend = StubBackend::default();
    backend.add_image("/img/first.jpg", png_bytes());
    backend.add_image("/img/second.jpg", png_bytes());

    let mut cache = ImageCache::new().unwrap();
    let first = vec![record("/img/first.jpg", 1, "first", 1.0)];
    let second = vec![record("/img/second.jpg", 1, "second", 2.0)];

    // キャッシュは追記マージのみなので、バッチが続けて走っても壊れない
    let a = materialize(&backend, &mut cache, &first).await;
    let b = materialize(&backend, &mut cache, &second).await;

    assert_eq!(a + b, 2);
    assert!(cache.contains("/img/first.jpg"));
    assert!(cache.contains("/img/second.jpg"));
}
