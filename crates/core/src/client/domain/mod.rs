pub mod attendance_api;
pub mod server_reply;
