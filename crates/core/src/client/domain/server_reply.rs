use serde::Deserialize;

/// JSON body returned by every attendance endpoint.
///
/// `msg` is the only field the client relies on; it is displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerReply {
    pub msg: String,
    #[serde(default)]
    pub success: Option<bool>,
    /// Only present on a successful face login.
    #[serde(default)]
    pub role: Option<String>,
}

impl ServerReply {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            success: None,
            role: None,
        }
    }

    /// `false` only when the server said so explicitly.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}
