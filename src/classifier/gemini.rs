//! Gemini API (generateContent)

use super::{ClassificationTransport, GenerateRequest};
use crate::config::{Config, Credential};
use crate::error::{Result, WasteAiError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const AUTH_HINT: &str = "APIキーと利用枠(quota)を確認してください";

/// Gemini APIリクエスト
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiTransport {
    client: Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| WasteAiError::TransportFailure(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ClassificationTransport for GeminiTransport {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerateRequest,
    ) -> Result<Option<String>> {
        let body = build_body(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WasteAiError::TransportFailure("タイムアウトしました".into())
                } else {
                    WasteAiError::TransportFailure(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %text, "gemini api error");
            return Err(status_error(status, &text));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| WasteAiError::MalformedResponse(format!("レスポンスJSON不正: {}", e)))?;

        Ok(extract_text(payload))
    }
}

fn build_body(request: &GenerateRequest) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: &request.mime_type,
                        data: &request.data,
                    },
                },
                Part::Text {
                    text: &request.prompt,
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// 最初の候補のテキストを連結
fn extract_text(response: GeminiResponse) -> Option<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        tracing::warn!(%reason, "prompt blocked");
    }

    let candidate = response.candidates.into_iter().next()?;
    if let Some(reason) = candidate.finish_reason.as_deref() {
        tracing::debug!(%reason, "finish reason");
    }

    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn status_error(status: StatusCode, body: &str) -> WasteAiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            WasteAiError::AuthorizationError(format!("{} ({})", AUTH_HINT, status.as_u16()))
        }
        // 不正なキーは400で返る
        StatusCode::BAD_REQUEST
            if body.contains("API_KEY_INVALID") || body.contains("API key not valid") =>
        {
            WasteAiError::AuthorizationError(format!("{} ({})", AUTH_HINT, status.as_u16()))
        }
        _ => WasteAiError::TransportFailure(format!("API error: {}", status)),
    }
}
