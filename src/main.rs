//! engine3d viewer
//!
//! Loads a RON scene (or the built-in spinning cube), renders it with the
//! software rasterizer at a fixed resolution and blits the pixel buffer to
//! a macroquad window.
//!
//! Controls: W/S forward/back, A/D strafe, Space/Shift up/down, Q/E yaw,
//! T/G pitch, L toggles lighting, F toggles fog.

use macroquad::prelude::*;

use engine3d::rasterizer::{Camera, Renderer, HEIGHT, WIDTH};
use engine3d::world::{default_scene, load_scene, SceneSetup};
use engine3d::VERSION;

/// Units per second
const MOVE_SPEED: f64 = 3.0;
/// Radians per second
const TURN_SPEED: f64 = 1.5;
/// Visibility used when fog is toggled on without a configured value
const DEFAULT_FOG: f64 = 0.6;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("engine3d v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_setup() -> SceneSetup {
    let result = match std::env::args().nth(1) {
        Some(path) => load_scene(&path),
        None => {
            tracing::info!("no scene file given, using the built-in cube");
            default_scene().build(std::path::Path::new("."))
        }
    };

    match result {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!("failed to load scene: {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_input(camera: &mut Camera, dt: f64) {
    let step = MOVE_SPEED * dt;
    let turn = TURN_SPEED * dt;

    if is_key_down(KeyCode::W) {
        camera.move_forward(step);
    }
    if is_key_down(KeyCode::S) {
        camera.move_forward(-step);
    }
    if is_key_down(KeyCode::A) {
        camera.strafe(-step);
    }
    if is_key_down(KeyCode::D) {
        camera.strafe(step);
    }
    if is_key_down(KeyCode::Space) {
        camera.rise(step);
    }
    if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
        camera.rise(-step);
    }
    if is_key_down(KeyCode::Q) {
        camera.turn(turn, 0.0);
    }
    if is_key_down(KeyCode::E) {
        camera.turn(-turn, 0.0);
    }
    if is_key_down(KeyCode::T) {
        camera.turn(0.0, -turn);
    }
    if is_key_down(KeyCode::G) {
        camera.turn(0.0, turn);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let SceneSetup { width, height, mut camera, settings, mut scene } = load_setup();
    let configured_fog = settings.fog;
    let mut renderer = Renderer::new(width, height, settings);

    tracing::info!(width, height, "=== engine3d v{} ===", VERSION);

    loop {
        let dt = get_frame_time() as f64;

        handle_input(&mut camera, dt);

        if is_key_pressed(KeyCode::L) {
            renderer.settings.lighting = !renderer.settings.lighting;
            tracing::info!(lighting = renderer.settings.lighting, "toggled lighting");
        }
        if is_key_pressed(KeyCode::F) {
            renderer.settings.fog = match renderer.settings.fog {
                Some(_) => None,
                None => Some(configured_fog.unwrap_or(DEFAULT_FOG)),
            };
            tracing::info!(fog = ?renderer.settings.fog, "toggled fog");
        }

        scene.update(dt);
        renderer.render_frame(&scene.draw_items(), &camera, &scene.textures);

        // Draw framebuffer to screen
        clear_background(BLACK);
        let fb_texture = Texture2D::from_rgba8(width as u16, height as u16, &renderer.framebuffer.to_rgba());
        fb_texture.set_filter(FilterMode::Nearest);

        draw_texture_ex(
            &fb_texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
