pub mod recording_feedback;
pub mod stdout_feedback;
