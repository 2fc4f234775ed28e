//! CPU software rasterizer
//!
//! Features:
//! - Explicit model/view/projection/viewport transform pipeline
//! - Points, DDA lines, line loops and barycentric triangle fill
//! - Perspective-correct texture coordinates
//! - Double-buffered color output with a 16-bit depth buffer
//!
//! # Module Organization
//!
//! - `math` - Vec2, Vec3, Vec4 and 4x4 matrix helpers
//! - `types` - Color, Texture, RasterSettings
//! - `frame` - FrameConfig, FrameBuffers, PresentSurface
//! - `render` - Rasteriser, RenderObject and the primitive algorithms

#![allow(dead_code)]

mod frame;
mod math;
mod render;
mod types;

pub use frame::*;
pub use math::*;
pub use render::*;
pub use types::*;

/// Default screen dimensions
pub const WIDTH: usize = 1200;
pub const HEIGHT: usize = 738;
