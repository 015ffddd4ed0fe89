//! Tauri Logo Scene: headless Bevy rendering of an animated 3D logo
//!
//! Extruded text and an extruded logo are lit and filmed by a camera that
//! drifts along a random velocity and jumps to a new random spot every few
//! seconds. Frames are rendered offscreen and streamed to the web canvas.
//!
//! Architecture:
//! - Scene assets (typeface glyphs, SVG path data) are parsed and extruded
//!   before the render thread starts
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - GPU texture -> Buffer -> CPU channel -> Tauri frontend
//! - Frame data transferred via custom protocol (JPEG compression) or Base64-encoded RGBA
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and per-scene settings
//! - `error`: Error types
//! - `logging`: Logger setup
//! - `geometry`: Typeface and path parsing, extrusion into meshes
//! - `controller`: Camera drift and viewport state
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `manager`: Scene lifetime
//!   - `commands`: Tauri command handlers
//!   - `protocol`: Custom protocol handlers
//! - `bevy`: Bevy engine integration
//!   - `components`: ECS components
//!   - `resources`: Global resources
//!   - `plugins`: Frame readback plugin
//!   - `systems`: Scene, camera, resize and teardown systems
//!   - `app`: Application setup

pub mod bevy;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod tauri_bridge;

use std::sync::Mutex;

use config::SceneConfig;
use error::Result;
use logging::{init_logging, LoggingConfig};
use tauri::Manager;
use tauri_bridge::{SceneChannels, SceneManager};

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() -> Result<()> {
    let config = SceneConfig::load()?;
    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..Default::default()
    });
    log::info!("starting");

    // Shared state outlives individual scenes
    let channels = SceneChannels::new(config.width, config.height);
    let mut manager = SceneManager::new(config.clone(), channels.clone());

    // Render from launch; the frontend's create_scene adopts this scene
    manager.create(config.width, config.height)?;

    // Clone for the custom protocol handler
    let protocol_buffer = channels.frame_buffer.clone();
    let protocol_perf_stats = channels.perf_stats.clone();

    let app = tauri::Builder::default()
        .manage(Mutex::new(manager))
        .manage(channels.frame_buffer)
        .manage(channels.perf_stats)
        .manage(channels.mouse_input)
        // Register custom protocol "frame://" for direct binary transfer
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let buffer = protocol_buffer.clone();
            let perf_stats = protocol_perf_stats.clone();

            // Handle the request in a separate thread to avoid blocking
            std::thread::spawn(move || {
                // For Tauri v2, URL format is: http://frame.localhost/path
                let response = tauri_bridge::protocol::handle_frame_protocol(
                    request.uri().path(),
                    &buffer,
                    &perf_stats,
                );
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::create_scene,
            tauri_bridge::commands::destroy_scene,
            tauri_bridge::commands::resize_canvas,
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats,
            tauri_bridge::commands::send_mouse_input
        ])
        .build(tauri::generate_context!())?;

    app.run(|handle, event| {
        if let tauri::RunEvent::Exit = event {
            let manager = handle.state::<Mutex<SceneManager>>();
            if let Ok(mut manager) = manager.lock() {
                manager.shutdown();
            }
            log::info!("exited");
        }
    });
    Ok(())
}
