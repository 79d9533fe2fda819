//! 分類結果の表示

use waste_ai_common::ClassificationResult;

/// 端末表示用テキスト
pub fn render_result(result: &ClassificationResult) -> String {
    let mut lines = vec![
        format!("品目: {}", result.waste_name),
        format!("区分: {}  (信頼度 {})", result.category, result.confidence_percent()),
        format!("素材: {}", result.material_type),
        format!("分別: {}", result.bin_designation()),
        "リサイクル手順:".to_string(),
    ];

    lines.extend(
        result
            .recycling_steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("  {}. {}", i + 1, step)),
    );

    lines.join("\n")
}
