//! Waste AI
//!
//! 廃棄物写真の取得・正規化と、マルチモーダルAIによる分類

pub mod acquisition;
pub mod camera;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
