use super::media::MediaType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use sha2::{Digest, Sha256};

/// 送信用の画像データ（メモリ上のみ）
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// "data:image/jpeg;base64,..." 形式
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type.mime(), self.to_base64())
    }

    /// Data URLから復元。base64でないもの・不正なものはNone
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        lazy_static::lazy_static! {
            static ref DATA_URL_RE: Regex =
                Regex::new(r"^data:([\w.+-]+/[\w.+-]+)(?:;[\w-]+=[\w.-]+)*;base64,(.*)$").unwrap();
        }

        let caps = DATA_URL_RE.captures(data_url.trim())?;
        let media_type = MediaType::from_mime(&caps[1]);
        let bytes = STANDARD.decode(caps[2].trim()).ok()?;
        Some(Self::new(bytes, media_type))
    }

    /// SHA-256 (hex)。ログでの画像識別用
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    pub fn short_digest(&self) -> String {
        self.digest()[..12].to_string()
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .field("digest", &self.short_digest())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_roundtrip() {
        let payload = ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0x00, 0x10], MediaType::Jpeg);
        let url = payload.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let parsed = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_data_url_with_parameters() {
        let parsed = ImagePayload::from_data_url("data:image/png;charset=utf-8;base64,AAEC").unwrap();
        assert_eq!(parsed.media_type(), &MediaType::Png);
        assert_eq!(parsed.bytes(), &[0, 1, 2]);
    }

    #[test]
    fn test_invalid_data_url() {
        assert!(ImagePayload::from_data_url("not a data url").is_none());
        assert!(ImagePayload::from_data_url("data:image/png,rawtext").is_none());
        assert!(ImagePayload::from_data_url("data:image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_digest_stable() {
        let a = ImagePayload::new(b"abc".to_vec(), MediaType::Png);
        let b = ImagePayload::new(b"abc".to_vec(), MediaType::Jpeg);
        assert_eq!(
            a.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.short_digest().len(), 12);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let payload = ImagePayload::new(vec![1; 64], MediaType::Png);
        let debug = format!("{:?}", payload);
        assert!(debug.contains("len: 64"));
        assert!(!debug.contains("[1, 1"));
    }
}
