use std::io::Write;

use crate::feedback::domain::feedback_sink::FeedbackSink;

/// Prints each message on its own line of the given writer (stdout by default).
pub struct StdoutFeedback<W: Write + Send = std::io::Stdout> {
    out: W,
}

impl StdoutFeedback {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl Default for StdoutFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> StdoutFeedback<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> FeedbackSink for StdoutFeedback<W> {
    fn show(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{message}").and_then(|_| self.out.flush()) {
            log::warn!("Failed to write feedback: {e}");
        }
    }
}
