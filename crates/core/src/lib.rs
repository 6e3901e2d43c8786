pub mod capture;
pub mod client;
pub mod encoding;
pub mod feedback;
pub mod pipeline;
pub mod shared;
