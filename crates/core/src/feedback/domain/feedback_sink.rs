/// Where the outcome of an interaction is shown to the user.
///
/// Every call replaces the previous message; the last one written wins.
pub trait FeedbackSink: Send {
    fn show(&mut self, message: &str);
}
