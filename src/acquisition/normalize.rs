//! 画像の正規化（再エンコード）
//!
//! 分類サービスが直接受け付けない形式をJPEGへ変換する。
//! JPEGはアルファを持たないため、透過部分は白で塗りつぶす。

use crate::error::{Result, WasteAiError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};

/// メモリ上の画像をデコード
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| WasteAiError::ImageLoad(e.to_string()))
}

/// 透過部分を白背景に合成してRGBにする
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba: RgbaImage = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        rgb.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }

    rgb
}

/// RGB画像をJPEGにエンコード
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode_image(img)
        .map_err(|e| WasteAiError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;
    Ok(buffer)
}

/// デコード → 白背景合成 → JPEG
pub fn normalize_to_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = decode(bytes)?;
    let rgb = flatten_on_white(&img);
    encode_jpeg(&rgb, quality)
}
