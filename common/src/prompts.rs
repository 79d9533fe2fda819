//! プロンプト生成モジュール
//!
//! - REFERENCE_SET_SIZE: 品目照合の参照規模
//! - build_classification_prompt: 分類用プロンプト

use crate::schema::SchemaOptions;

/// プロンプトで示す参照データベースの規模
pub const REFERENCE_SET_SIZE: &str = "40,000";

/// 分類プロンプト生成
///
/// # Arguments
/// * `options` - 区分集合とbinColor有無
///
/// # Returns
/// 画像と一緒に送る固定指示文
pub fn build_classification_prompt(options: &SchemaOptions) -> String {
    let categories = options
        .category_set
        .categories()
        .iter()
        .map(|c| format!("\"{}\"", c.as_str()))
        .collect::<Vec<_>>();

    let category_list = match categories.as_slice() {
        [a, b] => format!("{} or {}", a, b),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
        [] => String::new(),
    };

    let bin_line = if options.include_bin_color {
        "State the disposal bin (color or designation) the item belongs in.\n"
    } else {
        ""
    };

    format!(
        r#"Analyze this image of waste material.
Identify the specific item from a database of over {REFERENCE_SET_SIZE} waste materials.
Predict its common name.
Classify it strictly as {category_list}.
Identify the material type (e.g., Plastic, Metal, Biological).
{bin_line}Provide a step-by-step procedure on how to recycle or dispose of it properly in a smart city context.
Give a confidence score between 0 and 1.
Return the result in JSON format."#
    )
}
