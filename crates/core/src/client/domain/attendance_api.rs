use thiserror::Error;

use crate::client::domain::server_reply::ServerReply;
use crate::encoding::domain::captured_image::CapturedImage;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response from {url} (HTTP {status}): {reason}")]
    InvalidResponse {
        url: String,
        status: u16,
        reason: String,
    },
}

/// The server-side face attendance endpoints.
///
/// Each call performs exactly one request. A reply whose HTTP status is an
/// error still carries a displayable `msg` and is returned as `Ok`.
pub trait AttendanceApi: Send {
    /// `POST /api/mark_attendance` with only the image.
    fn mark_attendance(&mut self, image: &CapturedImage) -> Result<ServerReply, ClientError>;

    /// `POST /api/register` with the name and the image.
    fn register(&mut self, name: &str, image: &CapturedImage) -> Result<ServerReply, ClientError>;

    /// `POST /api/login_face` with the name and the image. Establishes a
    /// session on success.
    fn login_face(&mut self, name: &str, image: &CapturedImage)
        -> Result<ServerReply, ClientError>;
}
