//! Waste AI Common Library
//!
//! CLIと他のフロントエンドで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod schema;
pub mod prompts;
pub mod parser;

pub use types::{CategorySet, ClassificationResult, WasteCategory};
pub use error::{Error, Result};
pub use schema::SchemaOptions;
pub use prompts::build_classification_prompt;
pub use parser::{parse_classification_response, strip_code_fence};
