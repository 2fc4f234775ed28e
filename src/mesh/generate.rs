//! Procedural meshes

use super::{Mesh, PrimitiveType};
use crate::rasterizer::{Color, Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Alternating edge colors for line-loop shapes
const SHAPE_BROWN: Color = Color { r: 139, g: 90, b: 0, a: 255 };
const SHAPE_PURPLE: Color = Color { r: 139, g: 90, b: 255, a: 255 };

impl Mesh {
    /// A single triangle facing +Z, red at the base corners and yellow at the top
    pub fn triangle() -> Self {
        Self {
            primitive: PrimitiveType::Triangles,
            positions: vec![
                Vec4::new(0.5, -0.5, 0.0, 1.0),
                Vec4::new(0.0, 0.5, 0.0, 1.0),
                Vec4::new(-0.5, -0.5, 0.0, 1.0),
            ],
            colors: vec![Color::RED, Color::YELLOW, Color::RED],
            tex_coords: Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.5, 1.0),
                Vec2::new(1.0, 0.0),
            ]),
        }
    }

    /// One segment, red at `from` fading to blue at `to`
    pub fn line(from: Vec3, to: Vec3) -> Self {
        Self {
            primitive: PrimitiveType::Lines,
            positions: vec![Vec4::from_point(from), Vec4::from_point(to)],
            colors: vec![Color::RED, Color::BLUE],
            tex_coords: None,
        }
    }

    /// White points scattered uniformly in the [-1, 1] cube.
    /// The same seed always produces the same field.
    pub fn stars(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = (0..count)
            .map(|_| {
                Vec4::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    1.0,
                )
            })
            .collect();

        Self {
            primitive: PrimitiveType::Points,
            positions,
            colors: vec![Color::WHITE; count],
            tex_coords: None,
        }
    }

    /// Closed outline through `points`, edge colors alternating brown/purple
    pub fn shape(points: &[Vec3]) -> Self {
        let colors = (0..points.len())
            .map(|i| if i % 2 == 0 { SHAPE_BROWN } else { SHAPE_PURPLE })
            .collect();

        Self {
            primitive: PrimitiveType::LineLoop,
            positions: points.iter().copied().map(Vec4::from_point).collect(),
            colors,
            tex_coords: None,
        }
    }
}
