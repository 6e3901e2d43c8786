use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// A live picture source the user can snapshot on demand.
///
/// Implementations own the device handle between `open` and `close`; the
/// interaction layer only ever sees decoded [`Frame`]s.
pub trait FrameSource: Send {
    /// Acquires the underlying stream. Calling it on an open source is a no-op.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Returns the current frame.
    fn grab(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the stream. Safe to call more than once.
    fn close(&mut self);
}
