use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::imageops::FilterType;
use image::ExtendedColorType;

use crate::encoding::domain::captured_image::CapturedImage;
use crate::encoding::domain::frame_encoder::{EncodeError, FrameEncoder};
use crate::shared::constants::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_JPEG_QUALITY};
use crate::shared::frame::Frame;

/// Draws a frame onto a fixed-size canvas and encodes it as JPEG.
///
/// The frame is stretched to the canvas without preserving aspect ratio,
/// the same way a video element is drawn into a canvas rectangle. With no
/// canvas the frame is encoded at its native size.
pub struct JpegEncoder {
    canvas: Option<(u32, u32)>,
    quality: u8,
}

impl JpegEncoder {
    pub fn new(canvas: Option<(u32, u32)>, quality: u8) -> Result<Self, EncodeError> {
        if !(1..=100).contains(&quality) {
            return Err(EncodeError::InvalidQuality(quality));
        }
        if let Some((width, height)) = canvas {
            if width == 0 || height == 0 {
                return Err(EncodeError::InvalidCanvas { width, height });
            }
        }
        Ok(Self { canvas, quality })
    }

    pub fn canvas(&self) -> Option<(u32, u32)> {
        self.canvas
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            canvas: Some((DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)),
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl FrameEncoder for JpegEncoder {
    fn encode(&self, frame: &Frame) -> Result<CapturedImage, EncodeError> {
        let img = frame.to_rgb_image().ok_or(EncodeError::InvalidFrame {
            width: frame.width(),
            height: frame.height(),
        })?;

        let img = match self.canvas {
            Some((w, h)) if (w, h) != img.dimensions() => {
                image::imageops::resize(&img, w, h, FilterType::Triangle)
            }
            _ => img,
        };

        let (width, height) = img.dimensions();
        let mut bytes = Vec::new();
        ImageJpegEncoder::new_with_quality(&mut bytes, self.quality).encode(
            img.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )?;

        log::debug!(
            "Encoded frame {} as {width}x{height} JPEG ({} bytes)",
            frame.sequence(),
            bytes.len()
        );
        Ok(CapturedImage::new(bytes, width, height))
    }
}
