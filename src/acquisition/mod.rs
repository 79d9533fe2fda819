//! 画像取得と正規化
//!
//! アップロードされたファイル（またはカメラ画像）を送信可能なペイロードにする。
//! - 5 MiB を超える入力はデコード前に拒否
//! - 直接受け付けられない形式はJPEGへ再エンコード
//! - 再エンコードに失敗した場合は元データのまま進め、警告を付ける

mod media;
pub mod normalize;
mod payload;

pub use media::MediaType;
pub use payload::ImagePayload;

use crate::error::{Result, WasteAiError, MAX_UPLOAD_BYTES};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionOptions {
    pub max_bytes: u64,
    /// JPEG品質 (1-100)
    pub jpeg_quality: u8,
}

impl Default for AcquisitionOptions {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            jpeg_quality: 85,
        }
    }
}

/// 処理は続行できるが利用者に伝えるべき状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// 正規化に失敗し、元の形式のまま送信する
    FormatUnsupported { media_type: String, reason: String },
}

impl Advisory {
    pub fn user_message(&self) -> String {
        match self {
            Advisory::FormatUnsupported { media_type, .. } => format!(
                "警告: 画像形式 ({}) は解析に対応していない可能性があります。JPEGまたはPNGを推奨します",
                media_type
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Upload { file_name: String },
    Camera,
}

/// 取得済み画像
#[derive(Debug, Clone)]
pub struct Acquired {
    pub payload: ImagePayload,
    pub advisory: Option<Advisory>,
    pub source: ImageSource,
    /// 再エンコードしたか
    pub normalized: bool,
}

/// アップロードを受け付ける
///
/// サイズ超過は `FileTooLarge`。デコードより前に判定する。
pub fn accept_upload(
    bytes: Vec<u8>,
    declared_type: Option<&str>,
    file_name: &str,
    options: &AcquisitionOptions,
) -> Result<Acquired> {
    check_size(bytes.len() as u64, options)?;
    if bytes.is_empty() {
        return Err(WasteAiError::ImageLoad(format!("空のファイルです: {}", file_name)));
    }

    let media_type = resolve_media_type(&bytes, declared_type);
    if !media_type.is_image() {
        return Err(WasteAiError::ImageLoad(format!(
            "画像ファイルではありません: {} ({})",
            file_name, media_type
        )));
    }
    let source = ImageSource::Upload {
        file_name: file_name.to_string(),
    };

    if media_type.is_canonical() {
        tracing::debug!(%media_type, size = bytes.len(), "accepted as-is");
        return Ok(Acquired {
            payload: ImagePayload::new(bytes, media_type),
            advisory: None,
            source,
            normalized: false,
        });
    }

    match normalize::normalize_to_jpeg(&bytes, options.jpeg_quality) {
        Ok(jpeg) => {
            tracing::info!(from = %media_type, size = jpeg.len(), "normalized to image/jpeg");
            Ok(Acquired {
                payload: ImagePayload::new(jpeg, MediaType::Jpeg),
                advisory: None,
                source,
                normalized: true,
            })
        }
        Err(e) => {
            tracing::warn!(%media_type, error = %e, "normalization failed, forwarding original bytes");
            let advisory = Advisory::FormatUnsupported {
                media_type: media_type.mime().to_string(),
                reason: e.to_string(),
            };
            Ok(Acquired {
                payload: ImagePayload::new(bytes, media_type),
                advisory: Some(advisory),
                source,
                normalized: false,
            })
        }
    }
}

/// ファイルを読み込んで受け付ける
///
/// メタデータでサイズを確認してから読み込むため、巨大ファイルは読まずに拒否する。
pub async fn read_upload(path: &Path, options: &AcquisitionOptions) -> Result<Acquired> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() {
        return Err(WasteAiError::ImageLoad(format!(
            "ファイルではありません: {}",
            path.display()
        )));
    }
    check_size(meta.len(), options)?;

    let bytes = tokio::fs::read(path).await?;
    let declared = MediaType::from_extension(path).map(|m| m.mime().to_string());
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let options = *options;

    // デコード・再エンコードはCPU処理なのでブロッキングスレッドで
    tokio::task::spawn_blocking(move || {
        accept_upload(bytes, declared.as_deref(), &file_name, &options)
    })
    .await
    .map_err(|e| WasteAiError::ImageLoad(format!("画像処理タスク失敗: {}", e)))?
}

/// Data URL（data:image/...;base64,...）を受け付ける
///
/// デコード前にbase64の長さから概算サイズを判定する。
pub fn accept_data_url(data_url: &str, options: &AcquisitionOptions) -> Result<Acquired> {
    let encoded = data_url.split_once(',').map_or("", |(_, data)| data.trim());
    let padding = encoded.bytes().rev().take_while(|&b| b == b'=').count() as u64;
    check_size((encoded.len() as u64 / 4 * 3).saturating_sub(padding), options)?;

    let payload = ImagePayload::from_data_url(data_url)
        .ok_or_else(|| WasteAiError::ImageLoad("Data URLを解析できません".into()))?;
    let declared = payload.media_type().mime().to_string();

    accept_upload(payload.into_bytes(), Some(&declared), "data-url", options)
}

/// 保存先パスを決める（カメラ撮影時）
pub fn default_capture_path(dir: &Path) -> PathBuf {
    dir.join("capture.jpg")
}

pub(crate) fn check_size(size: u64, options: &AcquisitionOptions) -> Result<()> {
    if size > options.max_bytes {
        return Err(WasteAiError::FileTooLarge {
            size,
            limit: options.max_bytes,
        });
    }
    Ok(())
}

fn resolve_media_type(bytes: &[u8], declared_type: Option<&str>) -> MediaType {
    let declared = declared_type
        .map(MediaType::from_mime)
        .filter(|m| !matches!(m, MediaType::Other(_)));

    declared
        .or_else(|| MediaType::sniff(bytes))
        .unwrap_or_else(|| {
            MediaType::Other(declared_type.unwrap_or("application/octet-stream").to_string())
        })
}
