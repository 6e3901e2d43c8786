use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("input driver '{0}' is not available in this ffmpeg build")]
    UnknownDriver(String),
    #[error("failed to open camera {device}: {source}")]
    Device {
        device: String,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("camera {0} exposes no video stream")]
    NoVideoStream(String),
    #[error("ffmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame source is not open")]
    NotOpen,
    #[error("stream ended before a frame was decoded")]
    EndOfStream,
}
