//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

// =============================================================================
// Frame Buffer
// =============================================================================

/// One rendered frame as tightly packed RGBA8 rows
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Thread-safe latest-frame slot shared between Bevy and Tauri
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Frame>>>);

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Canvas Size
// =============================================================================

/// Last canvas size reported by the frontend
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Thread-safe canvas size, written on window resize and polled by Bevy
#[derive(Clone)]
pub struct SharedCanvasSize(pub Arc<Mutex<CanvasSize>>);

impl SharedCanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self(Arc::new(Mutex::new(CanvasSize { width, height })))
    }

    pub fn set(&self, width: u32, height: u32) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = CanvasSize { width, height };
        }
    }

    pub fn get(&self) -> Option<CanvasSize> {
        self.0.lock().ok().map(|guard| *guard)
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Teardown flag of one scene instance
#[derive(Clone, Default)]
pub struct SharedLifecycle(pub Arc<AtomicBool>);

impl SharedLifecycle {
    pub fn destroy(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// =============================================================================
// Mouse Input
// =============================================================================

/// Mouse input state received from frontend
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct MouseInput {
    /// Accumulated X movement delta
    pub delta_x: f32,
    /// Accumulated Y movement delta
    pub delta_y: f32,
    /// Accumulated scroll wheel delta
    pub scroll_delta: f32,
    /// Left mouse button is pressed
    pub left_button: bool,
}

/// Thread-safe mouse input shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedMouseInput(pub Arc<Mutex<MouseInput>>);

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub camera_resets: u32,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

// =============================================================================
// Bundle
// =============================================================================

/// Everything a scene instance shares with the Tauri side
#[derive(Clone)]
pub struct SceneChannels {
    pub frame_buffer: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub mouse_input: SharedMouseInput,
    pub canvas_size: SharedCanvasSize,
}

impl SceneChannels {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame_buffer: SharedFrameBuffer::default(),
            perf_stats: SharedPerfStats::default(),
            mouse_input: SharedMouseInput::default(),
            canvas_size: SharedCanvasSize::new(width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_clones_share_the_flag() {
        let lifecycle = SharedLifecycle::default();
        let seen_by_bevy = lifecycle.clone();
        assert!(!seen_by_bevy.is_destroyed());
        lifecycle.destroy();
        assert!(seen_by_bevy.is_destroyed());
    }

    #[test]
    fn mouse_input_carries_only_orbit_and_dolly_state() {
        let json = serde_json::to_value(MouseInput {
            delta_x: 1.0,
            left_button: true,
            ..Default::default()
        })
        .unwrap();
        let fields: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(fields.len(), 4);
        assert!(!fields.contains(&"right_button"));
    }

    #[test]
    fn canvas_size_keeps_latest_report() {
        let size = SharedCanvasSize::new(800, 600);
        size.set(1024, 768);
        size.set(640, 480);
        assert_eq!(size.get(), Some(CanvasSize { width: 640, height: 480 }));
    }
}
