use ffmpeg_next::format::context::Context;
use ffmpeg_next::util::frame::video::Video;

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Live camera capture through ffmpeg's input device layer
/// (`video4linux2`, `avfoundation`, `dshow`, ...).
///
/// Each [`grab`](FrameSource::grab) decodes the next frame the device
/// delivers and converts it to RGB24.
pub struct CameraSource {
    driver: String,
    device: String,
    camera: Option<OpenCamera>,
    grabbed: usize,
}

struct OpenCamera {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: CameraSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for CameraSource {}

impl CameraSource {
    pub fn new(driver: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            device: device.into(),
            camera: None,
            grabbed: 0,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    fn open_device(&self) -> Result<OpenCamera, CaptureError> {
        ffmpeg_next::init()?;

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == self.driver)
            .ok_or_else(|| CaptureError::UnknownDriver(self.driver.clone()))?;

        let ctx = ffmpeg_next::format::open_with(
            &self.device,
            &format,
            ffmpeg_next::Dictionary::new(),
        )
        .map_err(|e| CaptureError::Device {
            device: self.device.clone(),
            source: e,
        })?;
        let Context::Input(ictx) = ctx else {
            return Err(CaptureError::NoVideoStream(self.device.clone()));
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CaptureError::NoVideoStream(self.device.clone()))?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Opened {} camera {} ({width}x{height})",
            self.driver,
            self.device
        );

        Ok(OpenCamera {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        })
    }
}

/// What feeding one packet to the decoder produced.
enum PacketOutcome {
    Decoded(Frame),
    /// The decoder needs more packets before it can emit a frame.
    Pending,
    /// The decoder rejected the packet (e.g. a truncated MJPEG frame).
    Corrupt,
}

/// Feeds packets until one decodes into a frame. Corrupt packets are
/// skipped; running out of packets is [`CaptureError::EndOfStream`].
fn first_decoded<P>(
    packets: impl Iterator<Item = P>,
    mut feed: impl FnMut(P) -> Result<PacketOutcome, CaptureError>,
) -> Result<Frame, CaptureError> {
    for packet in packets {
        match feed(packet)? {
            PacketOutcome::Decoded(frame) => return Ok(frame),
            PacketOutcome::Pending => {}
            PacketOutcome::Corrupt => log::debug!("Skipping undecodable camera packet"),
        }
    }
    Err(CaptureError::EndOfStream)
}

impl OpenCamera {
    fn next_frame(&mut self, sequence: usize) -> Result<Frame, CaptureError> {
        let stream_index = self.stream_index;
        let (width, height) = (self.width, self.height);
        let decoder = &mut self.decoder;
        let scaler = &mut self.scaler;

        let packets = self
            .ictx
            .packets()
            .filter(|(stream, _)| stream.index() == stream_index)
            .map(|(_, packet)| packet);

        first_decoded(packets, |packet| {
            if decoder.send_packet(&packet).is_err() {
                return Ok(PacketOutcome::Corrupt);
            }
            let mut decoded = Video::empty();
            if decoder.receive_frame(&mut decoded).is_err() {
                return Ok(PacketOutcome::Pending);
            }
            let mut rgb = Video::empty();
            scaler.run(&decoded, &mut rgb)?;
            let pixels = extract_rgb_pixels(&rgb, width, height);
            Ok(PacketOutcome::Decoded(Frame::new(pixels, width, height, sequence)))
        })
    }
}

/// Copies RGB24 rows out of an ffmpeg frame, dropping line padding.
fn extract_rgb_pixels(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.camera.is_none() {
            self.camera = Some(self.open_device()?);
        }
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame, CaptureError> {
        let camera = self.camera.as_mut().ok_or(CaptureError::NotOpen)?;
        let frame = camera.next_frame(self.grabbed)?;
        self.grabbed += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        if self.camera.take().is_some() {
            log::debug!("Closed camera {}", self.device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_before_open_is_error() {
        let mut source = CameraSource::new("video4linux2", "/dev/video0");
        assert!(matches!(source.grab(), Err(CaptureError::NotOpen)));
    }

    #[test]
    fn test_unknown_driver_is_rejected() {
        let mut source = CameraSource::new("no-such-driver", "/dev/video0");
        match source.open() {
            Err(CaptureError::UnknownDriver(name)) => assert_eq!(name, "no-such-driver"),
            other => panic!("expected UnknownDriver, got {other:?}"),
        }
    }

    fn decoded(value: u8) -> PacketOutcome {
        PacketOutcome::Decoded(Frame::new(vec![value; 3], 1, 1, 0))
    }

    #[test]
    fn test_corrupt_packets_are_skipped() {
        let packets = vec![
            PacketOutcome::Corrupt,
            PacketOutcome::Pending,
            decoded(42),
            decoded(7),
        ];
        let frame = first_decoded(packets.into_iter(), Ok).unwrap();
        assert_eq!(frame.data(), &[42, 42, 42]);
    }

    #[test]
    fn test_only_corrupt_packets_is_end_of_stream() {
        let packets = vec![PacketOutcome::Corrupt, PacketOutcome::Corrupt];
        assert!(matches!(
            first_decoded(packets.into_iter(), Ok),
            Err(CaptureError::EndOfStream)
        ));
    }

    #[test]
    fn test_scaler_failure_still_propagates() {
        let result = first_decoded(std::iter::once(()), |_| Err(CaptureError::NotOpen));
        assert!(matches!(result, Err(CaptureError::NotOpen)));
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut source = CameraSource::new("video4linux2", "/dev/video0");
        source.close();
        source.close();
        assert_eq!(source.device(), "/dev/video0");
    }
}
