pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

pub const MARK_ATTENDANCE_PATH: &str = "/api/mark_attendance";
pub const REGISTER_PATH: &str = "/api/register";
pub const LOGIN_FACE_PATH: &str = "/api/login_face";

/// Filename and MIME type of the multipart `image` part.
pub const CAPTURE_FILENAME: &str = "capture.jpg";
pub const CAPTURE_MIME: &str = "image/jpeg";

/// Shown instead of submitting when a name-bearing request has no name.
pub const MISSING_NAME_MESSAGE: &str = "Enter your name!";

/// Capture canvas size; frames are stretched to it before encoding.
pub const DEFAULT_CANVAS_WIDTH: u32 = 640;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 480;

/// Matches the JPEG quality browsers use when none is requested (0.92).
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[cfg(target_os = "linux")]
pub const DEFAULT_CAMERA_DRIVER: &str = "video4linux2";
#[cfg(target_os = "linux")]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DRIVER: &str = "avfoundation";
#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DEVICE: &str = "0";

#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_DRIVER: &str = "dshow";
#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_DEVICE: &str = "video=Integrated Camera";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_DRIVER: &str = "video4linux2";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";
