//! Core types for the rasterizer

use super::math::Vec3;
use serde::{Serialize, Deserialize};

/// RGBA color (0-255 per channel)
///
/// Channels are laid out r, g, b, a in memory, so the packed form is
/// little-endian: opaque black packs to `0xFF000000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packed 32-bit value (r in the low byte, a in the high byte)
    pub fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }

    pub fn from_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Convert to [u8; 4] for framebuffer upload
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear blend: `self` at t = 0, `other` at t = 1
    pub fn lerp(self, other: Color, t: f32) -> Color {
        self.blend3(other, Color::BLACK, [1.0 - t, t, 0.0])
    }

    /// Convex combination of three colors, rounded per channel
    pub fn blend3(self, b: Color, c: Color, weights: [f32; 3]) -> Color {
        let [wa, wb, wc] = weights;
        let mix = |x: u8, y: u8, z: u8| (x as f32 * wa + y as f32 * wb + z as f32 * wc).round() as u8;
        Color {
            r: mix(self.r, b.r, c.r),
            g: mix(self.g, b.g, c.g),
            b: mix(self.b, b.b, c.b),
            a: mix(self.a, b.a, c.a),
        }
    }
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture with `cell`-pixel squares
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: Color, color2: Color) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Sample texture at UV coordinates (nearest, wrapping outside [0, 1))
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::BLACK;
        }
        let tx = ((u * self.width as f32).floor() as i64).rem_euclid(self.width as i64) as usize;
        let ty = ((v * self.height as f32).floor() as i64).rem_euclid(self.height as i64) as usize;
        self.pixels[ty * self.width + tx]
    }

    /// Nearest sample of a perspective-divided coordinate `(u/w, v/w, 1/w)`.
    /// The first two components are divided by the third before lookup.
    pub fn nearest_sample(&self, coord: Vec3) -> Color {
        self.sample(coord.x / coord.z, coord.y / coord.z)
    }
}

/// Per-draw rasterizer switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Background written by `clear_buffers`
    pub clear_color: Color,
    /// Points primitives ignore vertex colors and use this
    pub point_color: Color,
    /// Write triangle depth and reject pixels that are not strictly closer
    pub depth_test: bool,
    /// Interpolate untextured triangle colors with 1/w correction.
    /// Off: colors blend linearly in screen space (textures are always corrected)
    pub perspective_colors: bool,
    /// Skip triangles whose screen-space winding is clockwise (negative area)
    pub backface_cull: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            point_color: Color::WHITE,
            depth_test: false,
            perspective_colors: false,
            backface_cull: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout() {
        assert_eq!(Color::BLACK.to_u32(), 0xFF00_0000);
        assert_eq!(Color::from_u32(0xFF00_00FF), Color::RED);
        let c = Color::with_alpha(1, 2, 3, 4);
        assert_eq!(Color::from_u32(c.to_u32()), c);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Color::with_alpha(0, 0, 0, 255);
        let b = Color::with_alpha(200, 100, 40, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::with_alpha(100, 50, 20, 255));
    }

    #[test]
    fn test_blend3_convex() {
        let c = Color::RED.blend3(Color::GREEN, Color::BLUE, [0.5, 0.25, 0.25]);
        assert_eq!(c.r, 128);
        assert_eq!(c.g, 64);
        assert_eq!(c.b, 64);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_sample_wraps() {
        let tex = Texture::checkerboard(8, 8, 4, Color::WHITE, Color::BLACK);
        assert_eq!(tex.sample(0.0, 0.0), Color::WHITE);
        assert_eq!(tex.sample(0.6, 0.0), Color::BLACK);
        assert_eq!(tex.sample(1.0, 0.0), Color::WHITE);
        assert_eq!(tex.sample(-0.1, 0.0), Color::BLACK);
    }

    #[test]
    fn test_nearest_sample_divides_by_third_component() {
        let tex = Texture::checkerboard(8, 8, 4, Color::WHITE, Color::BLACK);
        // (0.3, 0.05, 0.5) un-projects to (0.6, 0.1)
        assert_eq!(tex.nearest_sample(Vec3::new(0.3, 0.05, 0.5)), Color::BLACK);
        assert_eq!(tex.nearest_sample(Vec3::new(0.1, 0.05, 0.5)), Color::WHITE);
    }

    #[test]
    fn test_sample_empty_texture() {
        let tex = Texture::new(0, 0);
        assert_eq!(tex.sample(0.5, 0.5), Color::BLACK);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        use std::io::Write;

        let mut temp_file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        writeln!(temp_file, "not an image").unwrap();
        assert!(Texture::from_file(temp_file.path()).is_err());
        assert!(Texture::from_file("no/such/texture.png").is_err());
    }
}
