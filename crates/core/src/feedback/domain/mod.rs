pub mod feedback_sink;
