use thiserror::Error;

#[derive(Error, Debug)]
pub enum SenseiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("バックエンドURLが設定されていません。`sensei-search config --set-backend-url URL` で設定してください")]
    MissingBackendUrl,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("APIリクエストエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SenseiError>;
