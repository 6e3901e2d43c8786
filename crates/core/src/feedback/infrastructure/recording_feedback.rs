use std::sync::{Arc, Mutex};

use crate::feedback::domain::feedback_sink::FeedbackSink;

/// Keeps the messages it is shown. Clones share the same record, so a
/// caller can hand one clone to a use case and read the other.
#[derive(Clone, Default)]
pub struct RecordingFeedback {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the feedback element currently displays.
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FeedbackSink for RecordingFeedback {
    fn show(&mut self, message: &str) {
        self.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_until_shown() {
        assert_eq!(RecordingFeedback::new().current(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let reader = RecordingFeedback::new();
        let mut writer = reader.clone();
        writer.show("first");
        writer.show("second");
        assert_eq!(reader.current().as_deref(), Some("second"));
        assert_eq!(reader.history(), vec!["first", "second"]);
    }
}
