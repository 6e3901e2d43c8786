use crate::capture::domain::frame_source::FrameSource;
use crate::client::domain::attendance_api::AttendanceApi;
use crate::client::domain::server_reply::ServerReply;
use crate::encoding::domain::captured_image::CapturedImage;
use crate::encoding::domain::frame_encoder::FrameEncoder;
use crate::feedback::domain::feedback_sink::FeedbackSink;
use crate::shared::constants::MISSING_NAME_MESSAGE;

/// Capture-and-submit interactions: grab → encode → POST → show `msg`.
///
/// One kiosk owns one camera and one server session, so a face login
/// followed by an attendance mark on the same kiosk is a single session.
/// Capture, encoding and transport failures are returned to the caller and
/// never written to the feedback sink.
pub struct AttendanceKiosk {
    source: Box<dyn FrameSource>,
    encoder: Box<dyn FrameEncoder>,
    api: Box<dyn AttendanceApi>,
    feedback: Box<dyn FeedbackSink>,
}

impl AttendanceKiosk {
    pub fn new(
        source: Box<dyn FrameSource>,
        encoder: Box<dyn FrameEncoder>,
        api: Box<dyn AttendanceApi>,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        Self {
            source,
            encoder,
            api,
            feedback,
        }
    }

    /// Snapshots the current frame and encodes it.
    pub fn snapshot(&mut self) -> Result<CapturedImage, Box<dyn std::error::Error>> {
        self.source.open()?;
        let frame = self.source.grab()?;
        Ok(self.encoder.encode(&frame)?)
    }

    /// Submits an attendance mark. The request carries only the image.
    pub fn mark_attendance(&mut self) -> Result<ServerReply, Box<dyn std::error::Error>> {
        let image = self.snapshot()?;
        let reply = self.api.mark_attendance(&image)?;
        self.report("Attendance", &reply);
        Ok(reply)
    }

    /// Registers a face under `name`.
    ///
    /// A blank name shows [`MISSING_NAME_MESSAGE`] and returns `None`
    /// without touching the network.
    pub fn register(
        &mut self,
        name: &str,
    ) -> Result<Option<ServerReply>, Box<dyn std::error::Error>> {
        let Some(name) = self.require_name(name) else {
            return Ok(None);
        };
        let image = self.snapshot()?;
        let reply = self.api.register(&name, &image)?;
        self.report("Registration", &reply);
        Ok(Some(reply))
    }

    /// Logs in by face. Same blank-name rule as [`register`](Self::register).
    pub fn login_face(
        &mut self,
        name: &str,
    ) -> Result<Option<ServerReply>, Box<dyn std::error::Error>> {
        let Some(name) = self.require_name(name) else {
            return Ok(None);
        };
        let image = self.snapshot()?;
        let reply = self.api.login_face(&name, &image)?;
        self.report("Face login", &reply);
        Ok(Some(reply))
    }

    /// Releases the camera. The kiosk reopens it on the next capture.
    pub fn close(&mut self) {
        self.source.close();
    }

    fn require_name(&mut self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            self.feedback.show(MISSING_NAME_MESSAGE);
            return None;
        }
        Some(name.to_string())
    }

    fn report(&mut self, action: &str, reply: &ServerReply) {
        if reply.is_success() {
            log::info!("{action} accepted");
        } else {
            log::info!("{action} rejected");
        }
        self.feedback.show(&reply.msg);
    }
}
