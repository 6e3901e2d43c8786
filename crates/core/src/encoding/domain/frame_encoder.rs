use thiserror::Error;

use crate::encoding::domain::captured_image::CapturedImage;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("frame buffer does not match {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
    #[error("canvas size must be non-zero, got {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),
    #[error("encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Turns a raw snapshot into an uploadable image blob.
pub trait FrameEncoder: Send {
    fn encode(&self, frame: &Frame) -> Result<CapturedImage, EncodeError>;
}
