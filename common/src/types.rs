//! 分類結果の型定義
//!
//! CLIと他のフロントエンドで共有される型:
//! - WasteCategory: 廃棄物区分
//! - CategorySet: 設定で選択する区分の集合
//! - ClassificationResult: 外部AIサービスから得た分類結果

use crate::error::{Error, Result};
use crate::schema::SchemaOptions;
use serde::{Deserialize, Serialize};

/// 廃棄物区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WasteCategory {
    Organic,
    Inorganic,
    Hazardous,
    #[serde(rename = "E-Waste")]
    EWaste,
}

impl WasteCategory {
    /// APIスキーマ上の表記
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Organic => "Organic",
            WasteCategory::Inorganic => "Inorganic",
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::EWaste => "E-Waste",
        }
    }

    /// 区分から導出される分別ボックス
    pub fn default_bin(&self) -> &'static str {
        match self {
            WasteCategory::Organic => "Green Bin",
            WasteCategory::Inorganic => "Blue/Yellow Bin",
            WasteCategory::Hazardous => "Red Bin",
            WasteCategory::EWaste => "E-Waste Collection Point",
        }
    }
}

impl std::fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WasteCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "organic" => Ok(WasteCategory::Organic),
            "inorganic" => Ok(WasteCategory::Inorganic),
            "hazardous" => Ok(WasteCategory::Hazardous),
            "e-waste" | "ewaste" => Ok(WasteCategory::EWaste),
            _ => Err(Error::Parse(format!("Unknown category: {}", s))),
        }
    }
}

/// 分類に使う区分の集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySet {
    /// Organic / Inorganic の2区分
    #[default]
    Binary,
    /// Hazardous / E-Waste を加えた4区分
    Extended,
}

impl CategorySet {
    pub fn categories(&self) -> &'static [WasteCategory] {
        match self {
            CategorySet::Binary => &[WasteCategory::Organic, WasteCategory::Inorganic],
            CategorySet::Extended => &[
                WasteCategory::Organic,
                WasteCategory::Inorganic,
                WasteCategory::Hazardous,
                WasteCategory::EWaste,
            ],
        }
    }

    pub fn contains(&self, category: WasteCategory) -> bool {
        self.categories().contains(&category)
    }
}

impl std::str::FromStr for CategorySet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "binary" | "2" => Ok(CategorySet::Binary),
            "extended" | "4" => Ok(CategorySet::Extended),
            _ => Err(Error::Parse(format!("Unknown category set: {}. Use binary or extended", s))),
        }
    }
}

/// AI分類結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// 品目名
    pub waste_name: String,

    /// 廃棄物区分
    pub category: WasteCategory,

    /// 素材
    pub material_type: String,

    /// 分別ボックス（スキーマで有効な場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_color: Option<String>,

    /// リサイクル・処分手順（順序付き）
    pub recycling_steps: Vec<String>,

    /// 信頼度 [0, 1]
    pub confidence: f64,
}

impl ClassificationResult {
    /// データモデルの不変条件を検証
    ///
    /// 値を丸めたり補正したりはしない。違反は全てエラーになる。
    pub fn validate(&self, options: &SchemaOptions) -> Result<()> {
        if self.waste_name.trim().is_empty() {
            return Err(Error::Validation("wasteName is empty".into()));
        }
        if self.material_type.trim().is_empty() {
            return Err(Error::Validation("materialType is empty".into()));
        }
        if !options.category_set.contains(self.category) {
            return Err(Error::Validation(format!(
                "category {} is not allowed in {:?} set",
                self.category, options.category_set
            )));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::Validation(format!(
                "confidence out of range: {}",
                self.confidence
            )));
        }
        if self.recycling_steps.is_empty() {
            return Err(Error::Validation("recyclingSteps is empty".into()));
        }
        if self.recycling_steps.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Validation("recyclingSteps contains a blank step".into()));
        }
        if options.include_bin_color
            && self.bin_color.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(Error::Validation("binColor is missing".into()));
        }
        Ok(())
    }

    /// 分別ボックス表示（binColorが無ければ区分から導出）
    pub fn bin_designation(&self) -> &str {
        match self.bin_color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ => self.category.default_bin(),
        }
    }

    /// 信頼度をパーセント表示
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}
