use thiserror::Error;

/// 5 MiB
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum WasteAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルサイズが大きすぎます: {size} bytes (上限 {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("カメラを使用できません: {0}")]
    CameraUnavailable(String),

    #[error("APIキーが設定されていないか不正です。`waste-ai config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingCredential,

    #[error("API認証エラー: {0}")]
    AuthorizationError(String),

    #[error("AIからの応答がありません")]
    EmptyResponse,

    #[error("APIレスポンスが不正です: {0}")]
    MalformedResponse(String),

    #[error("API通信エラー: {0}")]
    TransportFailure(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] waste_ai_common::Error),
}

impl WasteAiError {
    /// 利用者向けメッセージ
    ///
    /// サービスの生レスポンスは含めない（診断ログのみ）。
    pub fn user_message(&self) -> String {
        match self {
            WasteAiError::FileTooLarge { .. } => {
                "ファイルサイズが大きすぎます。5MB以下の画像をアップロードしてください".into()
            }
            WasteAiError::CameraUnavailable(_) => {
                "カメラにアクセスできません。権限と接続を確認してください".into()
            }
            WasteAiError::AuthorizationError(hint) => {
                format!("APIの認証に失敗しました。{}", hint)
            }
            WasteAiError::EmptyResponse
            | WasteAiError::MalformedResponse(_)
            | WasteAiError::Common(_) => {
                "画像を解析できませんでした。もう一度試すか、より鮮明な画像を使用してください".into()
            }
            WasteAiError::TransportFailure(_) => {
                "AIサービスに接続できませんでした。ネットワークを確認して再試行してください".into()
            }
            other => other.to_string(),
        }
    }

    /// 同じ画像で再試行して意味があるか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WasteAiError::EmptyResponse
                | WasteAiError::MalformedResponse(_)
                | WasteAiError::TransportFailure(_)
                | WasteAiError::AuthorizationError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WasteAiError>;
