//! Demo scene state
//!
//! Holds the objects the demo draws each frame and applies per-frame input
//! to their model matrices. Input arrives as a plain `FrameInput` so the
//! scene logic does not depend on the windowing layer.

use std::rc::Rc;

use crate::config::RenderConfig;
use crate::mesh::{load_mesh, Mesh};
use crate::rasterizer::{
    mat4_identity, mat4_mul, mat4_perspective, mat4_rotation, mat4_translation, Mat4, RenderObject,
    Texture, Vec3,
};

/// Where the textured triangles sit when the scene is (re)set
const TRIANGLE_DEPTH: f32 = -10.0;
/// Degrees per frame for the line-loop shapes
const SHAPE_SPIN: f32 = 0.3;
const MOVE_STEP: f32 = 0.01;

/// Input sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub roll_left: bool,
    pub roll_right: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub tilt_up: bool,
    pub tilt_down: bool,
    pub reset: bool,
    /// Mouse movement while the left button is held
    pub drag: Option<(f32, f32)>,
}

/// Main application state containing every drawable object
pub struct AppState {
    pub stars: RenderObject,
    /// Front-facing textured triangle
    pub front: RenderObject,
    /// Second textured triangle, turned 180 degrees about Y
    pub back: RenderObject,
    /// Two spinning outlines, turning in opposite directions
    pub shapes: [RenderObject; 2],
    /// Mesh loaded from `RenderConfig::mesh_path`, if any
    pub loaded: Option<RenderObject>,
    pub view: Mat4,
}

impl AppState {
    pub fn new(config: &RenderConfig, texture: Rc<Texture>) -> Self {
        let stars = RenderObject::new(Mesh::stars(config.star_count, config.star_seed));

        let mut shape_a = RenderObject::new(Mesh::shape(&[
            Vec3::new(-3.0, 0.0, -10.0),
            Vec3::new(-1.0, -1.0, -10.0),
            Vec3::new(2.0, -3.0, -10.0),
            Vec3::new(2.0, 1.0, -10.0),
            Vec3::new(0.0, 2.0, -10.0),
            Vec3::new(-1.0, 3.0, -10.0),
        ]));
        shape_a.model = mat4_translation(Vec3::new(-10.0, 0.0, -15.0));

        let mut shape_b = RenderObject::new(Mesh::shape(&[
            Vec3::new(-2.0, 0.0, -20.0),
            Vec3::new(-2.0, -2.0, -20.0),
            Vec3::new(4.0, -3.0, -20.0),
            Vec3::new(3.0, 1.0, -20.0),
            Vec3::new(0.0, 1.0, -20.0),
            Vec3::new(-1.0, 4.0, -20.0),
        ]));
        shape_b.model = mat4_translation(Vec3::new(10.0, 11.0, -20.0));

        let loaded = config.mesh_path.as_ref().and_then(|path| match load_mesh(path) {
            Ok(mesh) => {
                println!("Loaded mesh {} ({} vertices)", path, mesh.vertex_count());
                let mut object = RenderObject::new(mesh);
                object.model = mat4_translation(Vec3::new(0.0, 0.0, -5.0));
                Some(object)
            }
            Err(e) => {
                eprintln!("Failed to load mesh {}: {}", path, e);
                None
            }
        });

        let mut app = Self {
            stars,
            front: RenderObject::with_texture(Mesh::triangle(), texture.clone()),
            back: RenderObject::with_texture(Mesh::triangle(), texture),
            shapes: [shape_a, shape_b],
            loaded,
            view: mat4_identity(),
        };
        app.reset_triangles();
        app
    }

    /// Put both triangles back at their starting transforms
    pub fn reset_triangles(&mut self) {
        self.front.model = mat4_translation(Vec3::new(0.0, 0.0, TRIANGLE_DEPTH));
        self.back.model = mat4_mul(
            &mat4_translation(Vec3::new(0.0, 0.0, TRIANGLE_DEPTH)),
            &mat4_rotation(180.0, Vec3::new(0.0, 1.0, 0.0)),
        );
    }

    /// Advance one frame: spin the shapes, then apply input
    pub fn update(&mut self, input: &FrameInput) {
        let [a, b] = &mut self.shapes;
        post_multiply(a, &mat4_rotation(SHAPE_SPIN, Vec3::new(0.0, 0.0, 1.0)));
        post_multiply(b, &mat4_rotation(SHAPE_SPIN, Vec3::new(0.0, 0.0, -1.0)));

        if let Some((dx, dy)) = input.drag {
            post_multiply(&mut self.stars, &mat4_rotation(dx, Vec3::new(0.0, 1.0, 0.0)));
            post_multiply(&mut self.stars, &mat4_rotation(dy, Vec3::new(1.0, 0.0, 0.0)));
        }

        if input.roll_left {
            self.spin_triangles(0.3, Vec3::new(0.0, 0.0, 1.0));
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(0.0, 0.0, 1.0)));
        }
        if input.roll_right {
            self.spin_triangles(0.3, Vec3::new(0.0, 0.0, -1.0));
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(0.0, 0.0, -1.0)));
        }

        if input.reset {
            self.reset_triangles();
        }

        // The back triangle is mirrored, so horizontal moves are negated for it
        let mut shift = Vec3::ZERO;
        if input.left {
            shift.x -= MOVE_STEP;
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(0.0, -1.0, 0.0)));
        }
        if input.right {
            shift.x += MOVE_STEP;
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(0.0, 1.0, 0.0)));
        }
        if input.up {
            shift.y += MOVE_STEP;
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(-1.0, 0.0, 0.0)));
        }
        if input.down {
            shift.y -= MOVE_STEP;
            post_multiply(&mut self.stars, &mat4_rotation(0.1, Vec3::new(1.0, 0.0, 0.0)));
        }
        if shift != Vec3::ZERO {
            post_multiply(&mut self.front, &mat4_translation(shift));
            post_multiply(&mut self.back, &mat4_translation(Vec3::new(-shift.x, shift.y, 0.0)));
        }

        if input.tilt_up {
            self.spin_triangles(0.2, Vec3::new(-1.0, 0.0, 0.0));
        }
        if input.tilt_down {
            self.spin_triangles(0.2, Vec3::new(1.0, 0.0, 0.0));
        }
    }

    /// Rotate the triangles in opposite directions about `axis`
    fn spin_triangles(&mut self, degrees: f32, axis: Vec3) {
        post_multiply(&mut self.front, &mat4_rotation(degrees, axis));
        post_multiply(&mut self.back, &mat4_rotation(-degrees, axis));
    }

    /// Everything to draw this frame, back to front
    pub fn objects(&self) -> impl Iterator<Item = &RenderObject> {
        [&self.stars, &self.front, &self.back, &self.shapes[0], &self.shapes[1]]
            .into_iter()
            .chain(self.loaded.as_ref())
    }
}

/// Projection for the given screen size
pub fn projection_for(config: &RenderConfig, width: usize, height: usize) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    mat4_perspective(config.near, config.far, aspect, config.fov)
}

fn post_multiply(object: &mut RenderObject, m: &Mat4) {
    object.model = mat4_mul(&object.model, m);
}
