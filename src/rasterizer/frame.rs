//! Double-buffered color targets, depth buffer and the viewport transform
//!
//! Screen size, buffer lengths and the viewport ("port") matrix all derive
//! from one [`FrameConfig`]. [`FrameBuffers::resize`] swaps in a new config
//! and reallocates every buffer in one call, so they can never disagree.

use super::math::{mat4_mul, mat4_scale, mat4_transform, mat4_translation, Mat4, Vec3, Vec4};
use super::types::Color;

/// Depth value written by `clear` (farthest possible)
pub const DEPTH_CLEAR: u16 = u16::MAX;

/// Half of the 16-bit depth range, used as the viewport z scale and offset
const DEPTH_HALF_RANGE: f32 = (u16::MAX as f32) * 0.5;

/// Something that can show a finished frame (a window, a test recorder...)
pub trait PresentSurface {
    fn present(&mut self, pixels: &[Color], width: usize, height: usize);
}

/// Immutable screen configuration: dimensions plus the matching viewport matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    width: usize,
    height: usize,
    port: Mat4,
}

impl FrameConfig {
    pub fn new(width: usize, height: usize) -> Self {
        let half_screen = Vec3::new(
            (width as f32 - 1.0) * 0.5,
            (height as f32 - 1.0) * 0.5,
            DEPTH_HALF_RANGE,
        );
        let port = mat4_mul(&mat4_translation(half_screen), &mat4_scale(half_screen));

        Self { width, height, port }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Map a perspective-divided position into screen space
    pub fn to_screen(&self, ndc: Vec4) -> Vec4 {
        mat4_transform(&self.port, ndc)
    }

    /// Index of pixel (x, y), or None when it lies off screen
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Front/back color buffers plus one 16-bit depth buffer
pub struct FrameBuffers {
    config: FrameConfig,
    buffers: [Vec<Color>; 2],
    depth: Vec<u16>,
    current: usize,
}

impl FrameBuffers {
    pub fn new(width: usize, height: usize) -> Self {
        let config = FrameConfig::new(width, height);
        let len = config.pixel_count();
        Self {
            config,
            buffers: [vec![Color::BLACK; len], vec![Color::BLACK; len]],
            depth: vec![DEPTH_CLEAR; len],
            current: 0,
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Index (0 or 1) of the buffer currently being drawn into
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The buffer currently being drawn into
    pub fn current_buffer(&self) -> &[Color] {
        &self.buffers[self.current]
    }

    /// Read-only access to either color buffer
    pub fn buffer(&self, index: usize) -> &[Color] {
        &self.buffers[index & 1]
    }

    pub fn depth(&self) -> &[u16] {
        &self.depth
    }

    /// Color at (x, y) in the draw buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.config.index(x, y).map(|i| self.buffers[self.current][i])
    }

    /// Fill the draw buffer with `color` and reset depth to the far sentinel
    pub fn clear(&mut self, color: Color) {
        self.buffers[self.current].fill(color);
        self.depth.fill(DEPTH_CLEAR);
    }

    /// Present the draw buffer, then flip which buffer is drawn into
    pub fn swap<S: PresentSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.present(
            &self.buffers[self.current],
            self.config.width(),
            self.config.height(),
        );
        self.current ^= 1;
    }

    /// Reallocate both color buffers and the depth buffer for a new size,
    /// and recompute the viewport matrix
    pub fn resize(&mut self, width: usize, height: usize) {
        let config = FrameConfig::new(width, height);
        let len = config.pixel_count();
        self.buffers = [vec![Color::BLACK; len], vec![Color::BLACK; len]];
        self.depth = vec![DEPTH_CLEAR; len];
        self.config = config;
    }

    /// The pixel sink: writes `color` at (x, y) if on screen, otherwise does nothing
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.config.index(x, y) {
            self.buffers[self.current][i] = color;
        }
    }

    /// Depth-gated write: only lands if `z` is strictly closer than what is stored
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, z: u16, color: Color) -> bool {
        if let Some(i) = self.config.index(x, y) {
            if z < self.depth[i] {
                self.depth[i] = z;
                self.buffers[self.current][i] = color;
                return true;
            }
        }
        false
    }
}
