use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waste_ai_common::CategorySet;
use waste_ai_rust::acquisition::{self, Acquired, ImageSource};
use waste_ai_rust::camera::{self, CommandCamera, Facing};
use waste_ai_rust::classifier::{Classifier, GeminiTransport};
use waste_ai_rust::cli::{Cli, Commands, SchemaArgs};
use waste_ai_rust::config::Config;
use waste_ai_rust::error::{Result, WasteAiError};
use waste_ai_rust::report;
use waste_ai_rust::session::{Completion, ImageSession};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("✖ {}", e.user_message());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "waste_ai_rust=debug,waste_ai=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Classify { image, data_url, schema } => {
            println!("♻ waste-ai - 廃棄物分類\n");
            let config = apply_schema_args(config, &schema);
            let mut session = ImageSession::new();

            println!("[1/2] 画像を読み込み中...");
            let options = config.acquisition_options();
            let acquired = match (image, data_url) {
                (_, Some(data_url)) => acquisition::accept_data_url(&data_url, &options)?,
                (Some(image), None) => acquisition::read_upload(&image, &options).await?,
                (None, None) => {
                    return Err(WasteAiError::ImageLoad("画像が指定されていません".into()));
                }
            };
            load_into_session(&mut session, acquired);

            println!("[2/2] AI解析中...");
            classify_in_session(&config, &mut session, &schema).await?;
        }

        Commands::Capture { output, device, front, front_device, classify, schema } => {
            println!("📷 waste-ai - カメラ撮影\n");
            let config = apply_schema_args(config, &schema);
            let options = config.acquisition_options();
            let facing = if front { Facing::User } else { Facing::Environment };

            let camera = CommandCamera {
                user_device: front_device,
                ..CommandCamera::with_device(device)
            };
            let acquired = tokio::task::spawn_blocking(move || {
                camera::capture_from_camera(&camera, facing, &options)
            })
            .await
            .map_err(|e| WasteAiError::CameraUnavailable(format!("撮影タスク失敗: {}", e)))??;

            let output = match output {
                Some(path) => path,
                None => acquisition::default_capture_path(&std::env::current_dir()?),
            };
            tokio::fs::write(&output, acquired.payload.bytes()).await?;
            println!("✔ 撮影画像を保存: {}", output.display());

            if classify {
                let mut session = ImageSession::new();
                load_into_session(&mut session, acquired);
                println!("\nAI解析中...");
                classify_in_session(&config, &mut session, &schema).await?;
            }
        }

        Commands::Config { set_api_key, categories, bin_color, model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if categories.is_some() || bin_color.is_some() || model.is_some() {
                if let Some(categories) = categories {
                    config.category_set = categories;
                }
                if let Some(bin_color) = bin_color {
                    config.include_bin_color = bin_color;
                }
                if let Some(model) = model {
                    config.model = model;
                }
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  エンドポイント: {}", config.api_base_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  区分セット: {:?}", config.category_set);
                println!("  分別ボックス回答: {}", if config.include_bin_color { "有効" } else { "無効" });
                println!("  最大アップロードサイズ: {} bytes", config.max_upload_bytes);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  APIキー: {}", if config.has_credential() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn apply_schema_args(mut config: Config, args: &SchemaArgs) -> Config {
    if args.extended {
        config.category_set = CategorySet::Extended;
    }
    if args.bin_color {
        config.include_bin_color = true;
    }
    config
}

fn load_into_session(session: &mut ImageSession, acquired: Acquired) {
    if acquired.normalized {
        println!("✔ JPEGに変換しました ({} bytes)", acquired.payload.len());
    } else {
        println!("✔ 画像を読み込みました ({}, {} bytes)", acquired.payload.media_type(), acquired.payload.len());
    }
    if let Some(advisory) = &acquired.advisory {
        println!("⚠ {}", advisory.user_message());
    }
    session.set_image(acquired);

    match session.source() {
        Some(ImageSource::Upload { file_name }) => tracing::info!(%file_name, "image loaded"),
        Some(ImageSource::Camera) => tracing::info!("camera image loaded"),
        None => {}
    }
}

/// 解析を実行し、失敗時は利用者の確認後に再試行する
async fn classify_in_session(config: &Config, session: &mut ImageSession, args: &SchemaArgs) -> Result<()> {
    if !session.can_classify() {
        return Err(WasteAiError::ImageLoad("解析する画像がありません".into()));
    }

    let transport = GeminiTransport::new(config)?;
    let classifier = Classifier::new(config, transport);

    while let Some(ticket) = session.begin_classification() {
        let spinner = spinner("解析中...");
        let outcome = classifier.classify(ticket.payload()).await;
        spinner.finish_and_clear();

        match session.complete(ticket, outcome) {
            Completion::Applied => {
                if let Some(result) = session.result() {
                    if args.json {
                        println!("{}", serde_json::to_string_pretty(result)?);
                    } else {
                        println!("✔ 解析完了\n");
                        println!("{}", report::render_result(result));
                    }
                }
                return Ok(());
            }
            Completion::Failed(e) => {
                if args.no_retry_prompt || !e.is_retryable() || !confirm_retry(&e) {
                    return Err(e);
                }
            }
            Completion::Stale => return Ok(()),
        }
    }

    Ok(())
}

fn confirm_retry(error: &WasteAiError) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(format!("{} 再試行しますか？", error.user_message()))
        .default(true)
        .interact()
        .unwrap_or(false)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
