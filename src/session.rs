//! 画面状態（画像1枚・結果1件）
//!
//! 新しい画像を取得すると前の画像と結果は破棄される。
//! 解析リクエストには単調増加のトークンを付け、最新でない応答は捨てる。

use crate::acquisition::{Acquired, Advisory, ImagePayload, ImageSource};
use crate::error::WasteAiError;
use std::sync::Arc;
use waste_ai_common::ClassificationResult;

/// 解析中リクエストの引換券
#[derive(Debug, Clone)]
pub struct ClassificationTicket {
    token: u64,
    payload: Arc<ImagePayload>,
}

impl ClassificationTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }
}

/// 応答の反映結果
#[derive(Debug)]
pub enum Completion {
    /// 結果を反映した
    Applied,
    /// 失敗を反映した（画像は保持、再試行可能）
    Failed(WasteAiError),
    /// 既に別の画像・リクエストに置き換わっていたため破棄
    Stale,
}

#[derive(Debug, Default)]
pub struct ImageSession {
    image: Option<Arc<ImagePayload>>,
    source: Option<ImageSource>,
    advisory: Option<Advisory>,
    result: Option<ClassificationResult>,
    error: Option<String>,
    latest_token: u64,
    in_flight: bool,
}

impl ImageSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得した画像に差し替える
    ///
    /// 前の画像・結果・エラーは破棄し、解析中の応答は無効になる。
    pub fn set_image(&mut self, acquired: Acquired) {
        tracing::debug!(digest = %acquired.payload.short_digest(), "image replaced");
        self.invalidate();
        self.image = Some(Arc::new(acquired.payload));
        self.source = Some(acquired.source);
        self.advisory = acquired.advisory;
        self.result = None;
        self.error = None;
    }

    /// 取得失敗を表示する（画像と結果はそのまま）
    pub fn report_error(&mut self, error: &WasteAiError) {
        self.error = Some(error.user_message());
    }

    /// 解析開始。画像が無い・解析中の場合はNone
    pub fn begin_classification(&mut self) -> Option<ClassificationTicket> {
        if self.in_flight {
            return None;
        }
        let payload = self.image.clone()?;

        self.latest_token += 1;
        self.in_flight = true;
        self.error = None;

        Some(ClassificationTicket {
            token: self.latest_token,
            payload,
        })
    }

    /// 解析結果を反映する
    pub fn complete(
        &mut self,
        ticket: ClassificationTicket,
        outcome: Result<ClassificationResult, WasteAiError>,
    ) -> Completion {
        if ticket.token != self.latest_token || !self.in_flight {
            tracing::warn!(token = ticket.token, latest = self.latest_token, "discarding stale response");
            return Completion::Stale;
        }

        self.in_flight = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                Completion::Applied
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.user_message());
                Completion::Failed(e)
            }
        }
    }

    /// 画像と結果を破棄（何度呼んでもよい）
    pub fn clear(&mut self) {
        self.invalidate();
        self.image = None;
        self.source = None;
        self.advisory = None;
        self.result = None;
        self.error = None;
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_deref()
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn can_classify(&self) -> bool {
        self.image.is_some() && !self.in_flight
    }

    fn invalidate(&mut self) {
        self.latest_token += 1;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::MediaType;
    use waste_ai_common::WasteCategory;

    fn acquired(tag: u8) -> Acquired {
        Acquired {
            payload: ImagePayload::new(vec![0xFF, 0xD8, 0xFF, tag], MediaType::Jpeg),
            advisory: None,
            source: ImageSource::Upload {
                file_name: format!("{}.jpg", tag),
            },
            normalized: false,
        }
    }

    fn result(name: &str) -> ClassificationResult {
        ClassificationResult {
            waste_name: name.to_string(),
            category: WasteCategory::Inorganic,
            material_type: "Aluminum".to_string(),
            bin_color: None,
            recycling_steps: vec!["Rinse".to_string()],
            confidence: 0.9,
        }
    }

    #[test]
    fn test_no_image_no_ticket() {
        let mut session = ImageSession::new();
        assert!(!session.can_classify());
        assert!(session.begin_classification().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_applied_result() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));

        let ticket = session.begin_classification().unwrap();
        assert!(session.is_loading());
        assert_eq!(ticket.payload().bytes()[3], 1);

        let completion = session.complete(ticket, Ok(result("Can")));
        assert!(matches!(completion, Completion::Applied));
        assert!(!session.is_loading());
        assert_eq!(session.result().unwrap().waste_name, "Can");
    }

    #[test]
    fn test_single_in_flight() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let _ticket = session.begin_classification().unwrap();
        assert!(session.begin_classification().is_none());
    }

    #[test]
    fn test_stale_response_after_new_image() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let ticket = session.begin_classification().unwrap();

        // 解析中に画像を差し替え
        session.set_image(acquired(2));
        assert!(!session.is_loading());

        let completion = session.complete(ticket, Ok(result("Old")));
        assert!(matches!(completion, Completion::Stale));
        assert!(session.result().is_none());
        assert_eq!(session.image().unwrap().bytes()[3], 2);
    }

    #[test]
    fn test_stale_response_after_clear() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let ticket = session.begin_classification().unwrap();
        session.clear();

        assert!(matches!(session.complete(ticket, Ok(result("Old"))), Completion::Stale));
        assert!(session.image().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_newer_request_wins() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let first = session.begin_classification().unwrap();
        session.set_image(acquired(2));
        let second = session.begin_classification().unwrap();
        assert!(second.token() > first.token());

        assert!(matches!(session.complete(second, Ok(result("New"))), Completion::Applied));
        assert!(matches!(session.complete(first, Ok(result("Old"))), Completion::Stale));
        assert_eq!(session.result().unwrap().waste_name, "New");
    }

    #[test]
    fn test_failure_keeps_image_for_retry() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let ticket = session.begin_classification().unwrap();

        let completion = session.complete(ticket, Err(WasteAiError::EmptyResponse));
        assert!(matches!(completion, Completion::Failed(WasteAiError::EmptyResponse)));
        assert!(!session.is_loading());
        assert!(session.image().is_some());
        assert!(session.error().is_some());
        assert!(session.can_classify());

        let retry = session.begin_classification().unwrap();
        assert!(session.error().is_none());
        assert!(matches!(session.complete(retry, Ok(result("Can"))), Completion::Applied));
    }

    #[test]
    fn test_new_image_clears_result() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let ticket = session.begin_classification().unwrap();
        session.complete(ticket, Ok(result("Can")));
        assert!(session.result().is_some());

        session.set_image(acquired(2));
        assert!(session.result().is_none());
    }

    #[test]
    fn test_acquisition_error_preserves_state() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        let ticket = session.begin_classification().unwrap();
        session.complete(ticket, Ok(result("Can")));

        session.report_error(&WasteAiError::FileTooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        });
        assert_eq!(session.image().unwrap().bytes()[3], 1);
        assert_eq!(session.result().unwrap().waste_name, "Can");
        assert!(session.error().unwrap().contains("5MB"));
    }

    #[test]
    fn test_clear_idempotent() {
        let mut session = ImageSession::new();
        session.set_image(acquired(1));
        session.clear();
        session.clear();
        assert!(session.image().is_none());
        assert!(session.source().is_none());
        assert!(!session.can_classify());
    }
}
