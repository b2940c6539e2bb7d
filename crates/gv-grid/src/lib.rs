//! Grid geometry and frame compositing for Gridvid.
//!
//! `geometry` computes which rows and columns receive line color;
//! `compositor` paints them into every frame of a video in parallel.

pub mod compositor;
pub mod geometry;

pub use compositor::{GridExt, apply_grid, clear_grid};
pub use geometry::{GridSpec, LineIndexSet};
