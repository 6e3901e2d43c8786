pub mod captured_image;
pub mod frame_encoder;
