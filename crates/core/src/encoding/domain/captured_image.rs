use crate::shared::constants::{CAPTURE_FILENAME, CAPTURE_MIME};

/// An encoded snapshot ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn file_name(&self) -> &'static str {
        CAPTURE_FILENAME
    }

    pub fn mime_type(&self) -> &'static str {
        CAPTURE_MIME
    }
}
