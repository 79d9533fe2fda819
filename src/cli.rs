use clap::{Parser, Subcommand};
use std::path::PathBuf;
use waste_ai_common::CategorySet;

#[derive(Parser)]
#[command(name = "waste-ai")]
#[command(about = "廃棄物写真AI分類ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 分類スキーマの上書き
#[derive(clap::Args, Clone, Debug, Default)]
pub struct SchemaArgs {
    /// 4区分（Organic/Inorganic/Hazardous/E-Waste）で分類
    #[arg(long)]
    pub extended: bool,

    /// 分別ボックスもAIに回答させる
    #[arg(long)]
    pub bin_color: bool,

    /// 結果をJSONで出力
    #[arg(long)]
    pub json: bool,

    /// 失敗時に再試行を確認しない
    #[arg(long)]
    pub no_retry_prompt: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像ファイルを分類
    Classify {
        /// 画像ファイルのパス
        #[arg(required_unless_present = "data_url")]
        image: Option<PathBuf>,

        /// 画像をData URL（data:image/...;base64,...）で渡す
        #[arg(long, conflicts_with = "image")]
        data_url: Option<String>,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// カメラで撮影
    Capture {
        /// 保存先（デフォルト: ./capture.jpg）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// カメラデバイス
        #[arg(short, long, default_value = "/dev/video0")]
        device: PathBuf,

        /// 前面カメラで撮影
        #[arg(long)]
        front: bool,

        /// 前面カメラのデバイス（未指定なら --device と同じ）
        #[arg(long)]
        front_device: Option<PathBuf>,

        /// 撮影後に分類する
        #[arg(short, long)]
        classify: bool,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 区分セット (binary/extended)
        #[arg(long)]
        categories: Option<CategorySet>,

        /// 分別ボックス回答の有効/無効
        #[arg(long)]
        bin_color: Option<bool>,

        /// モデル名
        #[arg(long)]
        model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
