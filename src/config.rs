use crate::acquisition::AcquisitionOptions;
use crate::error::{WasteAiError, Result, MAX_UPLOAD_BYTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use waste_ai_common::{CategorySet, SchemaOptions};

/// これより短いキーは設定ミスとみなす
pub const MIN_API_KEY_LEN: usize = 20;

const ENV_API_KEYS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// 起動時に一度だけ組み立て、参照で各コンポーネントに渡す
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub category_set: CategorySet,
    pub include_bin_color: bool,
    pub max_upload_bytes: u64,
    pub jpeg_quality: u8,

    /// 環境変数から読んだキー（保存しない）
    #[serde(skip)]
    pub env_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_seconds: 60,
            category_set: CategorySet::Binary,
            include_bin_color: false,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            jpeg_quality: 85,
            env_api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        // 環境変数を優先
        config.env_api_key = ENV_API_KEYS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| WasteAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("waste-ai").join("config.json"))
    }

    /// ネットワークに出る前に検証済みのキーを返す
    pub fn credential(&self) -> Result<Credential> {
        let raw = self
            .env_api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .ok_or(WasteAiError::MissingCredential)?;
        Credential::parse(raw)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        // 保存前に形式だけ確認
        Credential::parse(&key)?;
        self.api_key = Some(key.trim().to_string());
        self.save()
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_ok()
    }

    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            category_set: self.category_set,
            include_bin_color: self.include_bin_color,
        }
    }

    /// 上限は設定で下げられるが、5 MiB を超えては上げられない
    pub fn acquisition_options(&self) -> AcquisitionOptions {
        AcquisitionOptions {
            max_bytes: self.max_upload_bytes.min(MAX_UPLOAD_BYTES),
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }
}

/// 検証済みAPIキー
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim();
        if key.len() < MIN_API_KEY_LEN || key.chars().any(char::is_whitespace) {
            return Err(WasteAiError::MissingCredential);
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail: String = self.0.chars().skip(self.0.chars().count().saturating_sub(4)).collect();
        write!(f, "Credential(***{})", tail)
    }
}
