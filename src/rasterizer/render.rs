//! Core rendering functions
//!
//! Every object goes through the same pipeline: `mvp = projection * view * model`
//! once per draw, then per vertex `clip = mvp * position`, divide by w, and map
//! through the viewport matrix. The primitive rasterizers below consume those
//! screen-space vertices and write every pixel through `FrameBuffers::set_pixel`.

use std::rc::Rc;

use super::frame::{FrameBuffers, PresentSurface};
use super::math::{mat4_identity, mat4_mul, mat4_transform, Mat4, Vec2, Vec3, Vec4};
use super::types::{Color, RasterSettings, Texture};
use crate::mesh::{Mesh, PrimitiveType};

/// Vertices with |w| below this are not projected
const W_EPSILON: f32 = 1e-6;

/// Coverage tolerance: a sample is kept while the summed sub-areas stay
/// within this much of the triangle's area
const COVERAGE_SLACK: f32 = 0.9;

/// Samples whose summed sub-areas fall below this are treated as uncovered
const MIN_COVERAGE: f32 = 1.0;

/// A mesh placed in the world, optionally textured.
/// The texture is shared; the mesh belongs to this object.
pub struct RenderObject {
    pub model: Mat4,
    pub mesh: Mesh,
    pub texture: Option<Rc<Texture>>,
}

impl RenderObject {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            model: mat4_identity(),
            mesh,
            texture: None,
        }
    }

    pub fn with_texture(mesh: Mesh, texture: Rc<Texture>) -> Self {
        Self {
            model: mat4_identity(),
            mesh,
            texture: Some(texture),
        }
    }
}

/// A vertex after projection
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex {
    /// Pixel-space x, y and 16-bit-range depth
    pub pos: Vec4,
    /// Reciprocal of the clip-space w, before the perspective divide
    pub inv_w: f32,
}

impl ScreenVertex {
    /// A vertex already in screen space with no perspective (w = 1)
    pub fn flat(x: f32, y: f32) -> Self {
        Self { pos: Vec4::new(x, y, 0.0, 1.0), inv_w: 1.0 }
    }
}

/// Which axis a line advances along every iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Walking state for the DDA line: the major axis steps every pixel,
/// the minor axis steps when the accumulated error crosses one half.
/// Positions are i64 so far off-screen endpoints cannot overflow.
struct LineStepper {
    x: i64,
    y: i64,
    x_step: i64,
    y_step: i64,
    major: Axis,
}

impl LineStepper {
    fn step_major(&mut self, n: i64) {
        match self.major {
            Axis::X => self.x = self.x.saturating_add(self.x_step * n),
            Axis::Y => self.y = self.y.saturating_add(self.y_step * n),
        }
    }

    fn step_minor(&mut self, n: i64) {
        match self.major {
            Axis::X => self.y = self.y.saturating_add(self.y_step * n),
            Axis::Y => self.x = self.x.saturating_add(self.x_step * n),
        }
    }

    /// (position, step) along the major and minor axes
    fn axes(&self) -> ((i64, i64), (i64, i64)) {
        match self.major {
            Axis::X => ((self.x, self.x_step), (self.y, self.y_step)),
            Axis::Y => ((self.y, self.y_step), (self.x, self.x_step)),
        }
    }
}

/// True once a monotonic walk along one axis can no longer reach [0, extent)
fn leaving(pos: i64, step: i64, extent: i64) -> bool {
    (pos < 0 && step < 0) || (pos >= extent && step > 0)
}

/// Steps needed before a walk along one axis enters [0, extent)
fn steps_to_enter(pos: i64, step: i64, extent: i64) -> i64 {
    if pos < 0 && step > 0 {
        pos.saturating_neg()
    } else if pos >= extent && step < 0 {
        pos.saturating_sub(extent - 1)
    } else {
        0
    }
}

/// Signed screen area of triangle (a, b, c); positive for counter-clockwise
/// winding in a y-up frame
pub fn screen_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let area = ((a.x * b.y) + (b.x * c.y) + (c.x * a.y)) - ((b.x * a.y) + (c.x * b.y) + (a.x * c.y));
    area * 0.5
}

/// Barycentric weights of `p` for triangle (a, b, c), or None if `p` is
/// not covered. Each weight is the normalized area of the sub-triangle
/// opposite that vertex.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<[f32; 3]> {
    let area = screen_area(a, b, c).abs();
    if area <= f32::EPSILON {
        return None;
    }
    coverage(p, a, b, c, area)
}

/// Containment test + weights against a precomputed unsigned area
fn coverage(p: Vec2, a: Vec2, b: Vec2, c: Vec2, area: f32) -> Option<[f32; 3]> {
    let opposite_c = screen_area(a, p, b).abs();
    let opposite_a = screen_area(b, p, c).abs();
    let opposite_b = screen_area(c, p, a).abs();

    let sum = opposite_a + opposite_b + opposite_c;
    if sum > area + COVERAGE_SLACK || sum < MIN_COVERAGE {
        return None;
    }

    Some([opposite_a / area, opposite_b / area, opposite_c / area])
}

/// Software rasterizer driving one pair of frame buffers
pub struct Rasteriser {
    frame: FrameBuffers,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    pub settings: RasterSettings,
}

impl Rasteriser {
    pub fn new(width: usize, height: usize, settings: RasterSettings) -> Self {
        Self {
            frame: FrameBuffers::new(width, height),
            view: mat4_identity(),
            projection: mat4_identity(),
            view_projection: mat4_identity(),
            settings,
        }
    }

    pub fn frame(&self) -> &FrameBuffers {
        &self.frame
    }

    pub fn width(&self) -> usize {
        self.frame.config().width()
    }

    pub fn height(&self) -> usize {
        self.frame.config().height()
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
        self.view_projection = mat4_mul(&self.projection, &self.view);
    }

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
        self.view_projection = mat4_mul(&self.projection, &self.view);
    }

    /// Fill the draw buffer with the clear color and reset depth
    pub fn clear_buffers(&mut self) {
        self.frame.clear(self.settings.clear_color);
    }

    /// Present the finished frame and flip buffers
    pub fn swap_buffers<S: PresentSurface + ?Sized>(&mut self, surface: &mut S) {
        self.frame.swap(surface);
    }

    /// Reallocate every buffer and the viewport for a new screen size.
    /// Must not be called between `clear_buffers` and `swap_buffers` of a frame
    /// that is expected to keep its contents.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.frame.resize(width, height);
    }

    /// Rasterize one object using the algorithm for its primitive type
    pub fn draw_object(&mut self, object: &RenderObject) {
        let mvp = mat4_mul(&self.view_projection, &object.model);
        match object.mesh.primitive() {
            PrimitiveType::Points => self.rasterise_points(&mvp, &object.mesh),
            PrimitiveType::Lines => self.rasterise_lines(&mvp, &object.mesh),
            PrimitiveType::LineLoop => self.rasterise_line_loop(&mvp, &object.mesh),
            PrimitiveType::Triangles => {
                self.rasterise_triangles(&mvp, &object.mesh, object.texture.as_deref())
            }
        }
    }

    /// Clip -> NDC -> screen. None when w is (nearly) zero.
    fn project(&self, mvp: &Mat4, position: Vec4) -> Option<ScreenVertex> {
        let clip = mat4_transform(mvp, position);
        if clip.w.abs() < W_EPSILON {
            return None;
        }
        let ndc = clip.divide_by_w();
        Some(ScreenVertex {
            pos: self.frame.config().to_screen(ndc),
            inv_w: 1.0 / clip.w,
        })
    }

    fn rasterise_points(&mut self, mvp: &Mat4, mesh: &Mesh) {
        let color = self.settings.point_color;
        for &position in mesh.positions() {
            if let Some(v) = self.project(mvp, position) {
                self.frame.set_pixel(v.pos.x as i32, v.pos.y as i32, color);
            }
        }
    }

    fn rasterise_lines(&mut self, mvp: &Mat4, mesh: &Mesh) {
        let positions = mesh.positions();
        let colors = mesh.colors();

        // A trailing unpaired vertex is ignored
        for i in (0..positions.len() / 2).map(|pair| pair * 2) {
            self.rasterise_edge(mvp, (positions[i], colors[i]), (positions[i + 1], colors[i + 1]));
        }
    }

    fn rasterise_line_loop(&mut self, mvp: &Mat4, mesh: &Mesh) {
        let positions = mesh.positions();
        let colors = mesh.colors();
        let count = positions.len();
        if count < 2 {
            return;
        }

        for i in 0..count - 1 {
            self.rasterise_edge(mvp, (positions[i], colors[i]), (positions[i + 1], colors[i + 1]));
        }
        let last = count - 1;
        self.rasterise_edge(mvp, (positions[last], colors[last]), (positions[0], colors[0]));
    }

    fn rasterise_edge(&mut self, mvp: &Mat4, a: (Vec4, Color), b: (Vec4, Color)) {
        if let (Some(v0), Some(v1)) = (self.project(mvp, a.0), self.project(mvp, b.0)) {
            self.draw_line(v0.pos, v1.pos, a.1, b.1);
        }
    }

    fn rasterise_triangles(&mut self, mvp: &Mat4, mesh: &Mesh, texture: Option<&Texture>) {
        let positions = mesh.positions();
        let colors = mesh.colors();
        let tex_coords = mesh.tex_coords();

        // A trailing incomplete triangle is ignored
        for i in (0..positions.len() / 3).map(|tri| tri * 3) {
            let projected = [
                self.project(mvp, positions[i]),
                self.project(mvp, positions[i + 1]),
                self.project(mvp, positions[i + 2]),
            ];
            let [Some(v0), Some(v1), Some(v2)] = projected else {
                continue;
            };
            let verts = [v0, v1, v2];

            // Texture coordinates are carried as (u/w, v/w, 1/w)
            let textured = match (texture, tex_coords) {
                (Some(tex), Some(uvs)) => {
                    let promote = |uv: Vec2, v: &ScreenVertex| Vec3::new(uv.x, uv.y, 1.0) * v.inv_w;
                    Some((
                        tex,
                        [
                            promote(uvs[i], &verts[0]),
                            promote(uvs[i + 1], &verts[1]),
                            promote(uvs[i + 2], &verts[2]),
                        ],
                    ))
                }
                _ => None,
            };

            self.draw_triangle(verts, [colors[i], colors[i + 1], colors[i + 2]], textured);
        }
    }

    /// DDA line between two screen-space points with linearly blended colors.
    /// Plots one pixel per unit step along the longer axis, starting at `a`
    /// and stopping one step short of `b`. Coincident endpoints plot `a` once.
    ///
    /// Steps that lie before the screen on the major axis are skipped in one
    /// jump, and the walk stops once it has left the screen for good.
    pub fn draw_line(&mut self, a: Vec4, b: Vec4, color_a: Color, color_b: Color) {
        let dir = b - a;

        let mut stepper = LineStepper {
            x: a.x as i64,
            y: a.y as i64,
            x_step: if dir.x < 0.0 { -1 } else { 1 },
            y_step: if dir.y < 0.0 { -1 } else { 1 },
            major: if dir.y.abs() > dir.x.abs() { Axis::Y } else { Axis::X },
        };

        let (slope, range, major_extent, minor_extent) = match stepper.major {
            Axis::X => (dir.y / dir.x, dir.x.abs() as i64, self.width() as i64, self.height() as i64),
            Axis::Y => (dir.x / dir.y, dir.y.abs() as i64, self.height() as i64, self.width() as i64),
        };

        if range == 0 {
            self.plot(stepper.x, stepper.y, color_a);
            return;
        }

        let abs_slope = slope.abs();
        let reciprocal_range = 1.0 / range as f32;
        let mut error = 0.0;

        let ((major_pos, major_step), _) = stepper.axes();
        let skip = steps_to_enter(major_pos, major_step, major_extent).min(range);
        if skip > 0 {
            let travelled = skip as f64 * abs_slope as f64;
            let minor_steps = (travelled + 0.5).floor();
            error = (travelled - minor_steps) as f32;
            stepper.step_major(skip);
            stepper.step_minor(minor_steps as i64);
        }

        for i in skip..range {
            let ((major_pos, major_step), (minor_pos, minor_step)) = stepper.axes();
            if leaving(major_pos, major_step, major_extent) || leaving(minor_pos, minor_step, minor_extent) {
                break;
            }

            let t = i as f32 * reciprocal_range;
            self.plot(stepper.x, stepper.y, color_a.lerp(color_b, t));

            error += abs_slope;
            if error > 0.5 {
                error -= 1.0;
                stepper.step_minor(1);
            }
            stepper.step_major(1);
        }
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.frame.set_pixel(x, y, color);
        }
    }

    /// Fill a screen-space triangle.
    ///
    /// With a texture, `(u/w, v/w, 1/w)` coordinates are blended with the
    /// barycentric weights and divided back by the blended 1/w in the sampler,
    /// which is perspective-correct. Without one, vertex colors are blended
    /// with the raw screen-space weights unless `perspective_colors` is set.
    pub fn draw_triangle(
        &mut self,
        verts: [ScreenVertex; 3],
        colors: [Color; 3],
        textured: Option<(&Texture, [Vec3; 3])>,
    ) {
        let [a, b, c] = verts.map(|v| Vec2::new(v.pos.x, v.pos.y));

        let signed_area = screen_area(a, b, c);
        if self.settings.backface_cull && signed_area < 0.0 {
            return;
        }
        let area = signed_area.abs();
        if area.is_nan() || area <= f32::EPSILON {
            return;
        }

        let width = self.width() as f32;
        let height = self.height() as f32;
        let min_x = a.x.min(b.x).min(c.x).max(0.0).floor() as i32;
        let min_y = a.y.min(b.y).min(c.y).max(0.0).floor() as i32;
        let max_x = a.x.max(b.x).max(c.x).min(width).ceil() as i32;
        let max_y = a.y.max(b.y).max(c.y).min(height).ceil() as i32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec2::new(x as f32, y as f32);
                let Some(weights) = coverage(p, a, b, c, area) else {
                    continue;
                };

                let color = match &textured {
                    Some((texture, tex)) => {
                        let blended = tex[0] * weights[0] + tex[1] * weights[1] + tex[2] * weights[2];
                        texture.nearest_sample(blended)
                    }
                    None if self.settings.perspective_colors => {
                        let corrected = [
                            weights[0] * verts[0].inv_w,
                            weights[1] * verts[1].inv_w,
                            weights[2] * verts[2].inv_w,
                        ];
                        let total = corrected[0] + corrected[1] + corrected[2];
                        colors[0].blend3(colors[1], colors[2], corrected.map(|w| w / total))
                    }
                    None => colors[0].blend3(colors[1], colors[2], weights),
                };

                if self.settings.depth_test {
                    let z = weights[0] * verts[0].pos.z
                        + weights[1] * verts[1].pos.z
                        + weights[2] * verts[2].pos.z;
                    self.frame.set_pixel_with_depth(x, y, z.round().clamp(0.0, u16::MAX as f32) as u16, color);
                } else {
                    self.frame.set_pixel(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::mat4_translation;

    const CLEAR: Color = Color::BLACK;

    fn rasteriser(width: usize, height: usize) -> Rasteriser {
        let mut r = Rasteriser::new(width, height, RasterSettings::default());
        r.clear_buffers();
        r
    }

    fn lit_pixels(r: &Rasteriser) -> Vec<(i32, i32)> {
        let w = r.width();
        r.frame()
            .current_buffer()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != CLEAR)
            .map(|(i, _)| ((i % w) as i32, (i / w) as i32))
            .collect()
    }

    fn screen(x: f32, y: f32) -> Vec4 {
        Vec4::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn test_horizontal_line_plots_four_interpolated_pixels() {
        let mut r = rasteriser(8, 4);
        let a = Color::new(255, 0, 0);
        let b = Color::new(55, 200, 40);
        r.draw_line(screen(0.0, 0.0), screen(4.0, 0.0), a, b);

        assert_eq!(lit_pixels(&r), vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(r.frame().pixel(0, 0), Some(a));
        assert_eq!(r.frame().pixel(1, 0), Some(Color::new(205, 50, 10)));
        assert_eq!(r.frame().pixel(2, 0), Some(Color::new(155, 100, 20)));
        assert_eq!(r.frame().pixel(3, 0), Some(Color::new(105, 150, 30)));
    }

    #[test]
    fn test_reversed_line_plots_same_count() {
        let mut r = rasteriser(8, 4);
        r.draw_line(screen(4.0, 0.0), screen(0.0, 0.0), Color::WHITE, Color::WHITE);
        assert_eq!(lit_pixels(&r), vec![(1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_steep_line_has_one_pixel_per_row() {
        let mut r = rasteriser(8, 8);
        r.draw_line(screen(0.0, 0.0), screen(2.0, 6.0), Color::WHITE, Color::WHITE);

        let lit = lit_pixels(&r);
        assert_eq!(lit.len(), 6);
        for row in 0..6 {
            assert_eq!(lit.iter().filter(|(_, y)| *y == row).count(), 1);
        }
    }

    #[test]
    fn test_diagonal_line() {
        let mut r = rasteriser(8, 8);
        r.draw_line(screen(0.0, 0.0), screen(3.0, 3.0), Color::WHITE, Color::WHITE);
        assert_eq!(lit_pixels(&r), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_zero_length_line_plots_single_pixel() {
        let mut r = rasteriser(8, 8);
        r.draw_line(screen(3.5, 2.0), screen(3.5, 2.0), Color::RED, Color::BLUE);
        assert_eq!(lit_pixels(&r), vec![(3, 2)]);
        assert_eq!(r.frame().pixel(3, 2), Some(Color::RED));
    }

    #[test]
    fn test_line_off_screen_is_clipped_by_sink() {
        let mut r = rasteriser(4, 4);
        r.draw_line(screen(-10.0, 1.0), screen(10.0, 1.0), Color::WHITE, Color::WHITE);
        assert_eq!(lit_pixels(&r), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_line_beyond_i32_range_does_not_overflow() {
        let mut r = rasteriser(8, 8);
        r.draw_line(screen(3.0e9, 1.0), screen(3.0001e9, 1.0), Color::WHITE, Color::WHITE);
        r.draw_line(screen(-3.0e9, -3.0e9), screen(-1.0e9, 4.0e9), Color::WHITE, Color::WHITE);
        assert!(lit_pixels(&r).is_empty());
    }

    #[test]
    fn test_line_entering_from_far_off_screen() {
        let mut r = rasteriser(8, 4);
        r.draw_line(screen(-1.0e6, 2.0), screen(6.0, 2.0), Color::WHITE, Color::WHITE);
        assert_eq!(lit_pixels(&r), vec![(0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (5, 2)]);
    }

    #[test]
    fn test_barycentric_weights_inside_and_outside() {
        let a = Vec2::new(2.0, 1.0);
        let b = Vec2::new(30.0, 4.0);
        let c = Vec2::new(10.0, 25.0);
        let area = screen_area(a, b, c).abs();

        for y in 0..32 {
            for x in 0..32 {
                let p = Vec2::new(x as f32, y as f32);
                let sub = screen_area(a, p, b).abs() + screen_area(b, p, c).abs() + screen_area(c, p, a).abs();
                let inside = (sub - area).abs() < 1e-3;

                match barycentric(p, a, b, c) {
                    Some(w) if inside => {
                        assert!(w.iter().all(|&x| (-1e-5..=1.0 + 1e-5).contains(&x)));
                        assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-4);
                    }
                    Some(_) => assert!(sub <= area + COVERAGE_SLACK),
                    None => assert!(sub > area + COVERAGE_SLACK || sub < MIN_COVERAGE),
                }
            }
        }
    }

    #[test]
    fn test_barycentric_vertex_gets_full_weight() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(0.0, 10.0);
        let w = barycentric(a, a, b, c).unwrap();
        assert!((w[0] - 1.0).abs() < 1e-6 && w[1].abs() < 1e-6 && w[2].abs() < 1e-6);
        assert!(barycentric(Vec2::new(9.0, 9.0), a, b, c).is_none());
    }

    #[test]
    fn test_zero_area_triangle_draws_nothing() {
        let mut r = rasteriser(16, 16);
        let verts = [
            ScreenVertex::flat(1.0, 1.0),
            ScreenVertex::flat(5.0, 5.0),
            ScreenVertex::flat(10.0, 10.0),
        ];
        r.draw_triangle(verts, [Color::WHITE; 3], None);
        assert!(lit_pixels(&r).is_empty());

        let point = [ScreenVertex::flat(3.0, 3.0); 3];
        r.draw_triangle(point, [Color::WHITE; 3], None);
        assert!(lit_pixels(&r).is_empty());
    }

    #[test]
    fn test_triangle_fill_covers_interior_only() {
        let mut r = rasteriser(16, 16);
        let verts = [
            ScreenVertex::flat(0.0, 0.0),
            ScreenVertex::flat(10.0, 0.0),
            ScreenVertex::flat(0.0, 10.0),
        ];
        r.draw_triangle(verts, [Color::RED, Color::GREEN, Color::BLUE], None);

        assert_eq!(r.frame().pixel(0, 0), Some(Color::RED));
        assert!(r.frame().pixel(2, 2) != Some(CLEAR));
        assert_eq!(r.frame().pixel(9, 9), Some(CLEAR));
        assert_eq!(r.frame().pixel(12, 1), Some(CLEAR));
        assert!(lit_pixels(&r).iter().all(|&(x, y)| x + y <= 11));
    }

    #[test]
    fn test_triangle_bounding_box_clamps_to_screen() {
        let mut r = rasteriser(8, 8);
        let verts = [
            ScreenVertex::flat(-50.0, -50.0),
            ScreenVertex::flat(100.0, -50.0),
            ScreenVertex::flat(-50.0, 100.0),
        ];
        r.draw_triangle(verts, [Color::WHITE; 3], None);
        assert_eq!(lit_pixels(&r).len(), 64);
    }

    /// Vertex b is four times farther away than a and c
    fn perspective_triangle() -> [ScreenVertex; 3] {
        [
            ScreenVertex { pos: screen(0.0, 0.0), inv_w: 1.0 },
            ScreenVertex { pos: screen(20.0, 0.0), inv_w: 0.25 },
            ScreenVertex { pos: screen(0.0, 20.0), inv_w: 1.0 },
        ]
    }

    #[test]
    fn test_textured_triangle_is_perspective_correct() {
        let mut r = rasteriser(24, 24);
        let strips = Texture {
            width: 4,
            height: 1,
            pixels: vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE],
            name: "strips".to_string(),
        };
        let verts = perspective_triangle();
        let tex = [
            Vec3::new(0.0, 0.0, 1.0) * verts[0].inv_w,
            Vec3::new(1.0, 0.0, 1.0) * verts[1].inv_w,
            Vec3::new(0.0, 0.0, 1.0) * verts[2].inv_w,
        ];
        r.draw_triangle(verts, [Color::WHITE; 3], Some((&strips, tex)));

        // Weights at (10, 2) are (0.4, 0.5, 0.1): an affine blend would give
        // u = 0.5 (blue); dividing by the blended 1/w gives u = 0.2 (red)
        assert_eq!(r.frame().pixel(10, 2), Some(Color::RED));
    }

    #[test]
    fn test_untextured_colors_blend_in_screen_space_by_default() {
        let mut r = rasteriser(24, 24);
        let colors = [Color::BLACK, Color::WHITE, Color::BLACK];
        r.draw_triangle(perspective_triangle(), colors, None);
        assert_eq!(r.frame().pixel(10, 2), Some(Color::new(128, 128, 128)));
    }

    #[test]
    fn test_perspective_colors_option_corrects_untextured_blend() {
        let mut r = rasteriser(24, 24);
        r.settings.perspective_colors = true;
        let colors = [Color::BLACK, Color::WHITE, Color::BLACK];
        r.draw_triangle(perspective_triangle(), colors, None);

        let c = r.frame().pixel(10, 2).unwrap();
        assert!((50..=52).contains(&c.r), "got {:?}", c);
        assert_eq!(c.a, 255);
    }

    fn flat_at_depth(z: f32) -> [ScreenVertex; 3] {
        [
            ScreenVertex { pos: Vec4::new(0.0, 0.0, z, 1.0), inv_w: 1.0 },
            ScreenVertex { pos: Vec4::new(10.0, 0.0, z, 1.0), inv_w: 1.0 },
            ScreenVertex { pos: Vec4::new(0.0, 10.0, z, 1.0), inv_w: 1.0 },
        ]
    }

    #[test]
    fn test_depth_buffer_ignored_by_default() {
        let mut r = rasteriser(16, 16);
        r.draw_triangle(flat_at_depth(100.0), [Color::RED; 3], None);
        r.draw_triangle(flat_at_depth(5000.0), [Color::BLUE; 3], None);
        assert_eq!(r.frame().pixel(2, 2), Some(Color::BLUE));
        assert!(r.frame().depth().iter().all(|&d| d == u16::MAX));
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut r = rasteriser(16, 16);
        r.settings.depth_test = true;
        r.draw_triangle(flat_at_depth(100.0), [Color::RED; 3], None);
        r.draw_triangle(flat_at_depth(5000.0), [Color::BLUE; 3], None);
        assert_eq!(r.frame().pixel(2, 2), Some(Color::RED));
        assert_eq!(r.frame().depth()[2 * 16 + 2], 100);

        r.draw_triangle(flat_at_depth(10.0), [Color::GREEN; 3], None);
        assert_eq!(r.frame().pixel(2, 2), Some(Color::GREEN));
    }

    #[test]
    fn test_backface_cull_skips_clockwise() {
        let clockwise = [
            ScreenVertex::flat(0.0, 0.0),
            ScreenVertex::flat(0.0, 10.0),
            ScreenVertex::flat(10.0, 0.0),
        ];

        let mut r = rasteriser(16, 16);
        r.draw_triangle(clockwise, [Color::WHITE; 3], None);
        assert!(!lit_pixels(&r).is_empty());

        let mut r = rasteriser(16, 16);
        r.settings.backface_cull = true;
        r.draw_triangle(clockwise, [Color::WHITE; 3], None);
        assert!(lit_pixels(&r).is_empty());
    }

    fn square(primitive: PrimitiveType) -> RenderObject {
        let corners = vec![
            Vec4::new(-0.75, -0.75, 0.0, 1.0),
            Vec4::new(0.75, -0.75, 0.0, 1.0),
            Vec4::new(0.75, 0.75, 0.0, 1.0),
            Vec4::new(-0.75, 0.75, 0.0, 1.0),
        ];
        RenderObject::new(Mesh::new(primitive, corners, vec![Color::WHITE; 4], None).unwrap())
    }

    #[test]
    fn test_line_loop_draws_closing_edge() {
        let mut r = rasteriser(11, 11);
        r.draw_object(&square(PrimitiveType::LineLoop));
        // (1, 5) lies only on the edge from the last vertex back to the first
        assert_eq!(r.frame().pixel(1, 5), Some(Color::WHITE));
        assert_eq!(r.frame().pixel(8, 5), Some(Color::WHITE));
        assert_eq!(r.frame().pixel(5, 1), Some(Color::WHITE));

        let mut r = rasteriser(11, 11);
        r.draw_object(&square(PrimitiveType::Lines));
        assert_eq!(r.frame().pixel(1, 5), Some(CLEAR));
        assert_eq!(r.frame().pixel(8, 5), Some(CLEAR));
        assert_eq!(r.frame().pixel(5, 1), Some(Color::WHITE));
    }

    fn bottom_edge(primitive: PrimitiveType, extra: Option<Vec4>) -> RenderObject {
        let mut positions = vec![Vec4::new(-0.75, -0.75, 0.0, 1.0), Vec4::new(0.75, -0.75, 0.0, 1.0)];
        positions.extend(extra);
        let colors = vec![Color::WHITE; positions.len()];
        RenderObject::new(Mesh::new(primitive, positions, colors, None).unwrap())
    }

    #[test]
    fn test_two_vertex_line_loop_draws_both_directions() {
        // Screen x runs 1.25 -> 8.75 on row 1
        let mut r = rasteriser(11, 11);
        r.draw_object(&bottom_edge(PrimitiveType::LineLoop, None));
        let there_and_back = lit_pixels(&r);
        assert_eq!(there_and_back, (1..=8).map(|x| (x, 1)).collect::<Vec<_>>());

        let mut r = rasteriser(11, 11);
        r.draw_object(&bottom_edge(PrimitiveType::Lines, None));
        assert_eq!(lit_pixels(&r), (1..=7).map(|x| (x, 1)).collect::<Vec<_>>());
    }

    #[test]
    fn test_lines_ignore_trailing_vertex() {
        let mut r = rasteriser(11, 11);
        r.draw_object(&bottom_edge(PrimitiveType::Lines, None));
        let paired = lit_pixels(&r);

        let mut r = rasteriser(11, 11);
        r.draw_object(&bottom_edge(PrimitiveType::Lines, Some(Vec4::new(0.75, 0.75, 0.0, 1.0))));
        assert_eq!(lit_pixels(&r), paired);
    }

    #[test]
    fn test_degenerate_line_loop_is_empty() {
        let mut r = rasteriser(11, 11);
        let single = Mesh::new(
            PrimitiveType::LineLoop,
            vec![Vec4::default()],
            vec![Color::WHITE],
            None,
        )
        .unwrap();
        r.draw_object(&RenderObject::new(single));
        assert!(lit_pixels(&r).is_empty());
    }

    #[test]
    fn test_points_use_fixed_color_and_truncate() {
        let mut r = rasteriser(11, 11);
        let mesh = Mesh::new(
            PrimitiveType::Points,
            vec![Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(0.19, -0.19, 0.0, 1.0)],
            vec![Color::RED, Color::BLUE],
            None,
        )
        .unwrap();
        r.draw_object(&RenderObject::new(mesh));

        // 0.19 * 5 + 5 = 5.95 and -0.19 * 5 + 5 = 4.05: both truncate
        assert_eq!(lit_pixels(&r), vec![(5, 4), (5, 5)]);
        assert_eq!(r.frame().pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn test_zero_w_vertices_are_skipped() {
        let mut r = rasteriser(11, 11);
        let mesh = Mesh::new(
            PrimitiveType::Triangles,
            vec![
                Vec4::new(0.0, 0.0, 0.0, 0.0),
                Vec4::new(1.0, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 1.0, 0.0, 1.0),
            ],
            vec![Color::WHITE; 3],
            None,
        )
        .unwrap();
        r.draw_object(&RenderObject::new(mesh));

        let points = Mesh::new(PrimitiveType::Points, vec![Vec4::new(1.0, 1.0, 0.0, 0.0)], vec![Color::WHITE], None)
            .unwrap();
        r.draw_object(&RenderObject::new(points));
        assert!(lit_pixels(&r).is_empty());
    }

    #[test]
    fn test_model_view_projection_order() {
        let mut r = rasteriser(11, 11);
        r.set_view_matrix(mat4_translation(Vec3::new(-0.5, 0.0, 0.0)));
        r.set_projection_matrix(mat4_identity());

        let mut object = RenderObject::new(
            Mesh::new(PrimitiveType::Points, vec![Vec4::default()], vec![Color::WHITE], None).unwrap(),
        );
        object.model = mat4_translation(Vec3::new(0.0, 0.75, 0.0));
        r.draw_object(&object);

        // NDC (-0.5, 0.75) -> screen (2.5, 8.75)
        assert_eq!(lit_pixels(&r), vec![(2, 8)]);
    }

    #[test]
    fn test_textured_mesh_through_pipeline() {
        let mut r = rasteriser(21, 21);
        let red = Rc::new(Texture::checkerboard(4, 4, 4, Color::RED, Color::RED));
        let object = RenderObject::with_texture(Mesh::triangle(), red);
        r.draw_object(&object);

        let lit = lit_pixels(&r);
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| r.frame().pixel(x, y) == Some(Color::RED)));
    }

    #[test]
    fn test_clear_uses_configured_color() {
        let mut r = Rasteriser::new(4, 4, RasterSettings { clear_color: Color::BLUE, ..Default::default() });
        r.clear_buffers();
        assert!(r.frame().current_buffer().iter().all(|&c| c == Color::BLUE));

        r.resize(6, 3);
        r.clear_buffers();
        assert_eq!(r.frame().current_buffer().len(), 18);
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 3);
    }
}
