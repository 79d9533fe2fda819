//! 構造化出力スキーマ
//!
//! 外部サービスに宣言するレスポンススキーマ。2区分/4区分とbinColorの有無は
//! 設定で切り替え、クライアントは1つだけ持つ。

use crate::types::CategorySet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// スキーマ選択オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOptions {
    pub category_set: CategorySet,
    pub include_bin_color: bool,
}

impl SchemaOptions {
    /// 必須フィールド名（順序はプロパティ定義と同じ）
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["wasteName", "category", "materialType"];
        if self.include_bin_color {
            fields.push("binColor");
        }
        fields.push("recyclingSteps");
        fields.push("confidence");
        fields
    }

    /// responseSchema として送るJSON
    pub fn response_schema(&self) -> Value {
        let categories: Vec<&str> = self
            .category_set
            .categories()
            .iter()
            .map(|c| c.as_str())
            .collect();

        let mut properties = json!({
            "wasteName": {
                "type": "STRING",
                "description": "The predicted name of the waste item"
            },
            "category": {
                "type": "STRING",
                "enum": categories,
                "description": "Primary classification"
            },
            "materialType": {
                "type": "STRING",
                "description": "The specific material (e.g., HDPE Plastic, Aluminum)"
            },
            "recyclingSteps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Step by step recycling or disposal instructions"
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence score between 0 and 1"
            }
        });

        if self.include_bin_color {
            properties["binColor"] = json!({
                "type": "STRING",
                "description": "The disposal bin color or designation for this item"
            });
        }

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": self.required_fields(),
        })
    }
}
