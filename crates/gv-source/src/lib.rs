//! Video sources for Gridvid (synthetic noise, decoded files).

pub mod noise;
pub mod video;

pub use noise::{NoiseParams, noise_video, noise_video_seeded};
pub use video::{VideoInfo, load_video};
