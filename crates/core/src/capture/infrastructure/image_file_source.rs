use std::path::{Path, PathBuf};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Serves a still image as if it were a camera that never moves.
///
/// Lets the client run on machines without a capture device; every grab
/// returns the same pixels with an increasing sequence number.
pub struct ImageFileSource {
    path: PathBuf,
    frame: Option<Frame>,
    grabbed: usize,
}

impl ImageFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frame: None,
            grabbed: 0,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.frame.is_some() {
            return Ok(());
        }
        let img = image::open(&self.path).map_err(|e| CaptureError::Image {
            path: self.path.clone(),
            source: e,
        })?;
        self.frame = Some(Frame::from_rgb_image(img.to_rgb8(), 0));
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame, CaptureError> {
        let frame = self.frame.as_ref().ok_or(CaptureError::NotOpen)?;
        let grabbed = frame.clone().with_sequence(self.grabbed);
        self.grabbed += 1;
        Ok(grabbed)
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
