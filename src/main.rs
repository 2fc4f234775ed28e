//! softras: CPU software rasterizer
//!
//! Renders points, lines, line loops and textured triangles entirely on the
//! CPU into a double-buffered color target, then hands each finished frame
//! to macroquad for display.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod mesh;
mod rasterizer;

use std::rc::Rc;

use macroquad::prelude::{
    draw_texture_ex, is_key_down, is_key_pressed, is_mouse_button_down, mouse_delta_position,
    next_frame, screen_height, screen_width, vec2, Conf, DrawTextureParams, FilterMode, KeyCode,
    MouseButton, Texture2D, WHITE,
};

use app::{projection_for, AppState, FrameInput};
use config::{load_config, load_config_or_default, CONFIG_PATH};
use rasterizer::{Color, PresentSurface, Rasteriser, Texture};

/// Mouse drag sensitivity in degrees per normalized screen unit
const DRAG_DEGREES: f32 = 90.0;

fn window_conf() -> Conf {
    let config = load_config(CONFIG_PATH).unwrap_or_default();
    Conf {
        window_title: format!("softras v{}", VERSION),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Shows finished frames by uploading them as a texture stretched over the window
struct WindowSurface {
    bytes: Vec<u8>,
}

impl PresentSurface for WindowSurface {
    fn present(&mut self, pixels: &[Color], width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }

        self.bytes.clear();
        self.bytes.extend(pixels.iter().flat_map(|c| c.to_bytes()));

        let texture = Texture2D::from_rgba8(width as u16, height as u16, &self.bytes);
        texture.set_filter(FilterMode::Nearest);

        // Row 0 is the bottom of NDC space, so flip to put +Y up on screen
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                flip_y: true,
                ..Default::default()
            },
        );
    }
}

fn read_input() -> FrameInput {
    let drag = if is_mouse_button_down(MouseButton::Left) {
        let delta = mouse_delta_position();
        Some((delta.x * DRAG_DEGREES, delta.y * DRAG_DEGREES))
    } else {
        None
    };

    FrameInput {
        roll_left: is_key_down(KeyCode::Q),
        roll_right: is_key_down(KeyCode::E),
        left: is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::S),
        tilt_up: is_key_down(KeyCode::Up),
        tilt_down: is_key_down(KeyCode::Down),
        reset: is_key_down(KeyCode::Space),
        drag,
    }
}

fn load_texture(path: &str) -> Texture {
    match Texture::from_file(path) {
        Ok(tex) => {
            println!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
            tex
        }
        Err(e) => {
            eprintln!("{}, using checkerboard", e);
            Texture::checkerboard(64, 64, 8, Color::new(150, 60, 40), Color::new(90, 90, 90))
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = load_config_or_default(CONFIG_PATH);

    let texture = Rc::new(load_texture(&config.texture_path));
    let mut app = AppState::new(&config, texture);

    let (mut width, mut height) = (screen_width() as usize, screen_height() as usize);
    let mut rasteriser = Rasteriser::new(width, height, config.raster.clone());
    rasteriser.set_projection_matrix(projection_for(&config, width, height));

    let mut surface = WindowSurface { bytes: Vec::new() };

    println!("=== softras v{} ({}x{}) ===", VERSION, width, height);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        // Resize only between frames
        let (new_width, new_height) = (screen_width() as usize, screen_height() as usize);
        if (new_width, new_height) != (width, height) {
            width = new_width;
            height = new_height;
            rasteriser.resize(width, height);
            rasteriser.set_projection_matrix(projection_for(&config, width, height));
            println!("Resized to {}x{}", width, height);
        }

        rasteriser.set_view_matrix(app.view);
        rasteriser.clear_buffers();
        for object in app.objects() {
            rasteriser.draw_object(object);
        }
        rasteriser.swap_buffers(&mut surface);

        app.update(&read_input());

        next_frame().await;
    }
}
