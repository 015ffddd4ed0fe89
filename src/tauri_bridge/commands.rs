//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Mutex;
use tauri::State;

use super::manager::SceneManager;
use super::shared_state::{
    FrameResponse, PerformanceStats, SharedFrameBuffer, SharedMouseInput, SharedPerfStats,
};

/// Start the scene for a canvas of the given size
#[tauri::command]
pub fn create_scene(
    manager: State<Mutex<SceneManager>>,
    width: u32,
    height: u32,
) -> Result<(), String> {
    let mut manager = manager.lock().map_err(|e| e.to_string())?;
    manager.create(width, height).map_err(|e| {
        log::error!("scene creation failed: {e}");
        e.to_string()
    })
}

/// Tear down the running scene
#[tauri::command]
pub fn destroy_scene(manager: State<Mutex<SceneManager>>) -> Result<(), String> {
    let mut manager = manager.lock().map_err(|e| e.to_string())?;
    manager.destroy();
    Ok(())
}

/// Report the canvas size after a window resize
///
/// Returns false when no live scene is listening.
#[tauri::command]
pub fn resize_canvas(
    manager: State<Mutex<SceneManager>>,
    width: u32,
    height: u32,
) -> Result<bool, String> {
    let manager = manager.lock().map_err(|e| e.to_string())?;
    Ok(manager.resize(width, height))
}

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    state: State<SharedFrameBuffer>,
    perf_state: State<SharedPerfStats>,
) -> Result<FrameResponse, String> {
    let cmd_start = std::time::Instant::now();

    let guard = state.0.lock().map_err(|e| e.to_string())?;
    let Some(frame) = &*guard else {
        return Err("No frame yet (scene still loading)".into());
    };
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    // Measure Base64 encoding time
    let encode_start = std::time::Instant::now();
    let base64_data = STANDARD.encode(&frame.rgba);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    if let Ok(mut stats) = perf_state.0.lock() {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    }

    Ok(FrameResponse {
        data: base64_data,
        width: frame.width,
        height: frame.height,
    })
}

/// Size of the canvas the scene currently renders for
#[tauri::command]
pub fn get_render_size(manager: State<Mutex<SceneManager>>) -> Result<(u32, u32), String> {
    let manager = manager.lock().map_err(|e| e.to_string())?;
    manager
        .channels()
        .canvas_size
        .get()
        .map(|size| (size.width, size.height))
        .ok_or_else(|| "canvas size unavailable".to_string())
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(state: State<SharedPerfStats>) -> Result<PerformanceStats, String> {
    let guard = state.0.lock().map_err(|e| e.to_string())?;
    Ok(guard.clone())
}

/// Receive mouse input from frontend for camera control
/// Input deltas are accumulated until consumed by Bevy; a destroyed scene
/// has no controls and drops the input.
#[tauri::command]
pub fn send_mouse_input(
    manager: State<Mutex<SceneManager>>,
    state: State<SharedMouseInput>,
    delta_x: f32,
    delta_y: f32,
    scroll_delta: f32,
    left_button: bool,
) -> Result<(), String> {
    if !manager.lock().map_err(|e| e.to_string())?.is_active() {
        return Ok(());
    }

    let mut guard = state.0.lock().map_err(|e| e.to_string())?;
    // Accumulate deltas (will be cleared when Bevy reads them)
    guard.delta_x += delta_x;
    guard.delta_y += delta_y;
    guard.scroll_delta += scroll_delta;
    // Button state is just the current state
    guard.left_button = left_button;
    Ok(())
}
