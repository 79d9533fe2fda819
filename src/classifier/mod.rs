//! 廃棄物分類クライアント
//!
//! 1回の呼び出しで1回だけ外部サービスにリクエストする（自動リトライなし）。
//! - 認証情報の検証はネットワークに出る前
//! - 生のレスポンステキストは診断ログにのみ出す

mod gemini;

pub use gemini::GeminiTransport;

use crate::acquisition::ImagePayload;
use crate::config::{Config, Credential};
use crate::error::{Result, WasteAiError};
use async_trait::async_trait;
use serde_json::Value;
use waste_ai_common::{
    build_classification_prompt, parse_classification_response, ClassificationResult,
    SchemaOptions,
};

/// トランスポートに渡すリクエスト
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub mime_type: String,
    /// Base64エンコード済み画像
    pub data: String,
    pub response_schema: Value,
}

/// 外部推論サービスとの境界
#[async_trait]
pub trait ClassificationTransport: Send + Sync {
    /// レスポンステキストを返す。テキストが無ければNone
    async fn generate(&self, credential: &Credential, request: &GenerateRequest)
        -> Result<Option<String>>;
}

pub struct Classifier<'a, T> {
    config: &'a Config,
    transport: T,
}

impl<'a, T: ClassificationTransport> Classifier<'a, T> {
    pub fn new(config: &'a Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn schema_options(&self) -> SchemaOptions {
        self.config.schema_options()
    }

    pub fn build_request(&self, payload: &ImagePayload) -> GenerateRequest {
        let options = self.schema_options();
        GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_classification_prompt(&options),
            mime_type: payload.media_type().mime().to_string(),
            data: payload.to_base64(),
            response_schema: options.response_schema(),
        }
    }

    /// 画像を分類する
    pub async fn classify(&self, payload: &ImagePayload) -> Result<ClassificationResult> {
        let credential = self.config.credential()?;
        let options = self.schema_options();
        let request = self.build_request(payload);

        tracing::info!(
            model = %request.model,
            mime_type = %request.mime_type,
            digest = %payload.short_digest(),
            "classification request"
        );

        let text = self
            .transport
            .generate(&credential, &request)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or(WasteAiError::EmptyResponse)?;

        match parse_classification_response(&text, &options) {
            Ok(result) => {
                tracing::info!(
                    category = %result.category,
                    confidence = result.confidence,
                    "classification result"
                );
                Ok(result)
            }
            Err(waste_ai_common::Error::Empty) => Err(WasteAiError::EmptyResponse),
            Err(e) => {
                tracing::debug!(raw = %text, error = %e, "unparseable classification response");
                Err(WasteAiError::MalformedResponse(e.to_string()))
            }
        }
    }
}
