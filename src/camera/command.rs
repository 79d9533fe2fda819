//! 外部コマンド（ffmpeg）経由のカメラ
//!
//! V4L2デバイスから1フレームをPNGで標準出力に書き出させて読み込む。

use super::{CameraDevice, Facing, FrameSource};
use crate::error::{Result, WasteAiError};
use image::RgbImage;
use std::fs::File;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone)]
pub struct CommandCamera {
    /// 背面カメラのデバイス
    pub environment_device: PathBuf,
    /// 前面カメラのデバイス（未指定なら背面と同じ）
    pub user_device: Option<PathBuf>,
    pub program: String,
}

impl Default for CommandCamera {
    fn default() -> Self {
        Self {
            environment_device: PathBuf::from("/dev/video0"),
            user_device: None,
            program: "ffmpeg".into(),
        }
    }
}

impl CommandCamera {
    pub fn with_device(device: impl Into<PathBuf>) -> Self {
        Self {
            environment_device: device.into(),
            ..Default::default()
        }
    }

    fn device_for(&self, facing: Facing) -> &PathBuf {
        match facing {
            Facing::Environment => &self.environment_device,
            Facing::User => self.user_device.as_ref().unwrap_or(&self.environment_device),
        }
    }
}

impl CameraDevice for CommandCamera {
    fn open(&self, facing: Facing) -> Result<Box<dyn FrameSource>> {
        let device = self.device_for(facing).clone();

        if !device.exists() {
            return Err(WasteAiError::CameraUnavailable(format!(
                "デバイスが見つかりません: {}",
                device.display()
            )));
        }

        // 権限確認を兼ねてデバイスを保持する
        let handle = File::open(&device).map_err(|e| {
            WasteAiError::CameraUnavailable(format!("{}: {}", device.display(), e))
        })?;

        Ok(Box::new(CommandStream {
            device,
            program: self.program.clone(),
            handle: Some(handle),
        }))
    }
}

struct CommandStream {
    device: PathBuf,
    program: String,
    handle: Option<File>,
}

impl FrameSource for CommandStream {
    fn grab(&mut self) -> Result<RgbImage> {
        if self.handle.is_none() {
            return Err(WasteAiError::CameraUnavailable("カメラは既に閉じています".into()));
        }

        let device = self.device.to_string_lossy().to_string();
        let output = Command::new(&self.program)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "v4l2",
                "-i",
                &device,
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "png",
                "-",
            ])
            .output()
            .map_err(|e| WasteAiError::CameraUnavailable(format!("{} 実行エラー: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(code = ?output.status.code(), %stderr, "frame grab failed");
            return Err(WasteAiError::CameraUnavailable(format!(
                "フレーム取得に失敗しました (code {:?})",
                output.status.code()
            )));
        }

        let frame = image::load_from_memory(&output.stdout)
            .map_err(|e| WasteAiError::ImageLoad(format!("フレームのデコード失敗: {}", e)))?;
        Ok(frame.to_rgb8())
    }

    fn release(&mut self) {
        self.handle.take();
    }
}
