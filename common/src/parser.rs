//! APIレスポンスパーサー
//!
//! 外部サービスのレスポンステキストからJSONを取り出し、
//! ClassificationResultとして厳密にパース・検証する

use crate::error::{Error, Result};
use crate::schema::SchemaOptions;
use crate::types::ClassificationResult;

const FENCE: &str = "```";

/// Markdownのコードフェンスを除去
///
/// 先頭が ``` （```json 等の言語タグ付きも可）で始まり末尾が ``` で終わる場合のみ
/// 内側を返す。それ以外は前後の空白を除いた文字列をそのまま返す。
///
/// # Examples
/// ```
/// use waste_ai_common::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix(FENCE) else {
        return trimmed;
    };

    // 開始行の言語タグ（json など）を読み飛ばす
    let body = match inner.find('\n') {
        Some(newline) if is_language_tag(&inner[..newline]) => &inner[newline + 1..],
        Some(_) => inner,
        None => strip_inline_tag(inner),
    };

    body.trim()
}

/// 1行フェンスの言語タグ（```json {...}```）を除く
fn strip_inline_tag(inner: &str) -> &str {
    let tag_len = inner
        .find(|c: char| !is_tag_char(c))
        .unwrap_or(inner.len());
    let rest = &inner[tag_len..];

    if tag_len > 0 && rest.starts_with(char::is_whitespace) {
        rest
    } else {
        inner
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_language_tag(line: &str) -> bool {
    line.trim().chars().all(is_tag_char)
}

/// 分類レスポンスをパース
///
/// # Arguments
/// * `response` - サービスが返したテキスト
/// * `options` - 宣言したスキーマ
///
/// # Returns
/// * `Ok(ClassificationResult)` - パースと検証に成功
/// * `Err(Error::Empty)` - 空のレスポンス
/// * `Err(Error::Json | Error::Validation)` - スキーマ不一致
pub fn parse_classification_response(
    response: &str,
    options: &SchemaOptions,
) -> Result<ClassificationResult> {
    let json_str = strip_code_fence(response);
    if json_str.is_empty() {
        return Err(Error::Empty);
    }

    let mut result: ClassificationResult = serde_json::from_str(json_str)?;
    result.validate(options)?;

    // 宣言していない binColor は採用しない
    if !options.include_bin_color {
        result.bin_color = None;
    }
    Ok(result)
}
