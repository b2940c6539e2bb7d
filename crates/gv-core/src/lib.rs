//! Types, configuration, and shared structures for Gridvid.
//!
//! This crate contains the video buffer, frame views, errors and
//! configuration logic used across the Gridvid workspace.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod naming;
pub mod paths;
pub mod video;

pub use color::LineColor;
pub use config::GridvidConfig;
pub use error::{CoreError, CoreResult};
pub use frame::{FrameBuffer, FrameRef};
pub use paths::Paths;
pub use video::{GridState, VideoBuffer};
