//! Export modules for Gridvid (video encoding, still frames).

pub mod muxer;
pub mod still;

pub use muxer::{SaveOptions, VideoEncoder, save_video};
pub use still::{FrameOptions, save_frame};
