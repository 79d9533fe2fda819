//! メディアタイプ判定
//!
//! 宣言されたMIMEタイプ・拡張子・マジックナンバーから画像形式を決める

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Jpeg,
    Png,
    Webp,
    Heic,
    Heif,
    Gif,
    Avif,
    Bmp,
    Tiff,
    Other(String),
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => MediaType::Jpeg,
            "image/png" => MediaType::Png,
            "image/webp" => MediaType::Webp,
            "image/heic" => MediaType::Heic,
            "image/heif" => MediaType::Heif,
            "image/gif" => MediaType::Gif,
            "image/avif" => MediaType::Avif,
            "image/bmp" | "image/x-ms-bmp" => MediaType::Bmp,
            "image/tiff" => MediaType::Tiff,
            _ => MediaType::Other(mime),
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        let media_type = match ext.as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => MediaType::Jpeg,
            "png" => MediaType::Png,
            "webp" => MediaType::Webp,
            "heic" => MediaType::Heic,
            "heif" => MediaType::Heif,
            "gif" => MediaType::Gif,
            "avif" => MediaType::Avif,
            "bmp" => MediaType::Bmp,
            "tif" | "tiff" => MediaType::Tiff,
            _ => return None,
        };
        Some(media_type)
    }

    /// マジックナンバーから判定
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(MediaType::Jpeg);
        }
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(MediaType::Png);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(MediaType::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(MediaType::Webp);
        }
        if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            return Some(MediaType::Tiff);
        }
        if bytes.starts_with(b"BM") {
            return Some(MediaType::Bmp);
        }
        // ISO-BMFF (ftyp box)
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            return match &bytes[8..12] {
                b"avif" | b"avis" => Some(MediaType::Avif),
                b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" => Some(MediaType::Heic),
                b"mif1" | b"msf1" => Some(MediaType::Heif),
                _ => None,
            };
        }
        None
    }

    pub fn mime(&self) -> &str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
            MediaType::Heic => "image/heic",
            MediaType::Heif => "image/heif",
            MediaType::Gif => "image/gif",
            MediaType::Avif => "image/avif",
            MediaType::Bmp => "image/bmp",
            MediaType::Tiff => "image/tiff",
            MediaType::Other(mime) => mime,
        }
    }

    /// 分類サービスがそのまま受け付ける形式か
    pub fn is_canonical(&self) -> bool {
        matches!(
            self,
            MediaType::Jpeg | MediaType::Png | MediaType::Webp | MediaType::Heic | MediaType::Heif
        )
    }

    pub fn is_image(&self) -> bool {
        match self {
            MediaType::Other(mime) => mime.starts_with("image/"),
            _ => true,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(MediaType::from_mime("image/jpeg"), MediaType::Jpeg);
        assert_eq!(MediaType::from_mime("IMAGE/PNG"), MediaType::Png);
        assert_eq!(MediaType::from_mime("image/avif"), MediaType::Avif);
        assert_eq!(
            MediaType::from_mime("image/x-icon"),
            MediaType::Other("image/x-icon".into())
        );
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(MediaType::from_extension(Path::new("a.JPG")), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension(Path::new("b.avif")), Some(MediaType::Avif));
        assert_eq!(MediaType::from_extension(Path::new("c.txt")), None);
        assert_eq!(MediaType::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(MediaType::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaType::Jpeg));
        assert_eq!(MediaType::sniff(b"\x89PNG\r\n\x1a\n...."), Some(MediaType::Png));
        assert_eq!(MediaType::sniff(b"GIF89a......"), Some(MediaType::Gif));
        assert_eq!(MediaType::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(MediaType::Webp));
        assert_eq!(MediaType::sniff(b"\0\0\0\x1cftypavif\0\0"), Some(MediaType::Avif));
        assert_eq!(MediaType::sniff(b"\0\0\0\x18ftypheic\0\0"), Some(MediaType::Heic));
        assert_eq!(MediaType::sniff(b"hello world"), None);
        assert_eq!(MediaType::sniff(&[]), None);
    }

    #[test]
    fn test_canonical_set() {
        assert!(MediaType::Jpeg.is_canonical());
        assert!(MediaType::Png.is_canonical());
        assert!(MediaType::Webp.is_canonical());
        assert!(!MediaType::Avif.is_canonical());
        assert!(!MediaType::Gif.is_canonical());
        assert!(!MediaType::Other("image/x-icon".into()).is_canonical());
    }

    #[test]
    fn test_is_image() {
        assert!(MediaType::Bmp.is_image());
        assert!(MediaType::Other("image/x-icon".into()).is_image());
        assert!(!MediaType::Other("application/pdf".into()).is_image());
    }
}
