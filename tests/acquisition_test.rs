//! 画像取得テスト
//!
//! ファイル読み込みからペイロード生成までを検証

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tempfile::tempdir;
use waste_ai_rust::acquisition::{self, AcquisitionOptions, Advisory, ImageSource, MediaType};
use waste_ai_rust::error::WasteAiError;
use waste_ai_rust::session::ImageSession;

fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

/// 6MBのファイルは読み込み前に拒否され、直前の画像は残る
#[tokio::test]
async fn test_oversized_file_rejected_keeps_previous_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let small = dir.path().join("small.png");
    let large = dir.path().join("large.jpg");

    std::fs::write(&small, encode(&RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])), ImageFormat::Png)).unwrap();
    std::fs::write(&large, vec![0u8; 6 * 1024 * 1024]).unwrap();

    let options = AcquisitionOptions::default();
    let mut session = ImageSession::new();
    session.set_image(acquisition::read_upload(&small, &options).await.unwrap());
    let before = session.image().unwrap().digest();

    let err = acquisition::read_upload(&large, &options).await.unwrap_err();
    assert!(matches!(err, WasteAiError::FileTooLarge { size, .. } if size == 6 * 1024 * 1024));
    session.report_error(&err);

    assert_eq!(session.image().unwrap().digest(), before);
    assert!(session.error().unwrap().contains("5MB"));
}

/// 上限ちょうどは受け付ける
#[tokio::test]
async fn test_file_at_limit_accepted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("limit.jpg");
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(5 * 1024 * 1024, 0);
    std::fs::write(&path, &bytes).unwrap();

    let acquired = acquisition::read_upload(&path, &AcquisitionOptions::default())
        .await
        .unwrap();
    assert_eq!(acquired.payload.len(), 5 * 1024 * 1024);
    assert_eq!(acquired.payload.media_type(), &MediaType::Jpeg);
}

/// PNGはそのまま、ファイル名が記録される
#[tokio::test]
async fn test_png_passes_through() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("can.png");
    let bytes = encode(&RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 255])), ImageFormat::Png);
    std::fs::write(&path, &bytes).unwrap();

    let acquired = acquisition::read_upload(&path, &AcquisitionOptions::default())
        .await
        .unwrap();

    assert!(!acquired.normalized);
    assert_eq!(acquired.payload.bytes(), bytes.as_slice());
    assert_eq!(acquired.payload.media_type(), &MediaType::Png);
    assert_eq!(
        acquired.source,
        ImageSource::Upload { file_name: "can.png".into() }
    );
}

/// GIFはJPEGへ変換される
#[tokio::test]
async fn test_gif_is_normalized() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("peel.gif");
    std::fs::write(
        &path,
        encode(&RgbaImage::from_pixel(16, 16, Rgba([240, 200, 20, 255])), ImageFormat::Gif),
    )
    .unwrap();

    let acquired = acquisition::read_upload(&path, &AcquisitionOptions::default())
        .await
        .unwrap();

    assert!(acquired.normalized);
    assert!(acquired.advisory.is_none());
    assert_eq!(acquired.payload.media_type(), &MediaType::Jpeg);
    assert_eq!(&acquired.payload.bytes()[..2], &[0xFF, 0xD8]);
    assert!(acquired.payload.to_data_url().starts_with("data:image/jpeg;base64,"));
}

/// 変換できない形式は元データのまま警告付きで進む
#[tokio::test]
async fn test_undecodable_bmp_forwards_original() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.bmp");
    let bytes = b"BM-not-really-a-bitmap".to_vec();
    std::fs::write(&path, &bytes).unwrap();

    let acquired = acquisition::read_upload(&path, &AcquisitionOptions::default())
        .await
        .unwrap();

    assert!(!acquired.normalized);
    assert_eq!(acquired.payload.bytes(), bytes.as_slice());
    assert!(matches!(acquired.advisory, Some(Advisory::FormatUnsupported { .. })));
}
