//! カメラ撮影
//!
//! カメラのストリームは `CameraSession` が所有し、Dropで必ず解放する。
//! 撮影・キャンセル・エラーのどの経路でも解放は一度だけ。

mod command;

pub use command::CommandCamera;

use crate::acquisition::{
    check_size, normalize, Acquired, AcquisitionOptions, ImagePayload, ImageSource, MediaType,
};
use crate::error::{Result, WasteAiError};
use image::RgbImage;

/// カメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// 背面カメラ
    Environment,
    /// 前面カメラ
    User,
}

/// 開いているカメラのストリーム
pub trait FrameSource: Send {
    /// 現在のフレームを取得
    fn grab(&mut self) -> Result<RgbImage>;

    /// デバイスを解放
    fn release(&mut self);
}

/// カメラデバイス
///
/// 権限拒否・デバイスなしは `CameraUnavailable` を返すこと。
pub trait CameraDevice {
    fn open(&self, facing: Facing) -> Result<Box<dyn FrameSource>>;
}

/// カメラ表示中の状態
pub struct CameraSession {
    stream: Option<Box<dyn FrameSource>>,
}

impl CameraSession {
    pub fn open(device: &dyn CameraDevice, facing: Facing) -> Result<Self> {
        let stream = device.open(facing)?;
        tracing::debug!(?facing, "camera opened");
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// 現在のフレームを撮影してJPEGにする
    ///
    /// 撮影するとセッションは終了する（成功・失敗どちらでも解放）。
    /// エンコード後のサイズがアップロード上限を超えたら `FileTooLarge`。
    pub fn capture(mut self, options: &AcquisitionOptions) -> Result<Acquired> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| WasteAiError::CameraUnavailable("カメラは既に閉じています".into()))?;
        let frame = stream.grab()?;
        let jpeg = normalize::encode_jpeg(&frame, options.jpeg_quality)?;
        tracing::info!(
            width = frame.width(),
            height = frame.height(),
            size = jpeg.len(),
            "frame captured"
        );
        check_size(jpeg.len() as u64, options)?;

        Ok(Acquired {
            payload: ImagePayload::new(jpeg, MediaType::Jpeg),
            advisory: None,
            source: ImageSource::Camera,
            normalized: true,
        })
    }

    /// 撮影せずに閉じる
    pub fn close(self) {}
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            tracing::debug!("camera released");
        }
    }
}

/// カメラを開いて1枚撮影する
pub fn capture_from_camera(
    device: &dyn CameraDevice,
    facing: Facing,
    options: &AcquisitionOptions,
) -> Result<Acquired> {
    CameraSession::open(device, facing)?.capture(options)
}
